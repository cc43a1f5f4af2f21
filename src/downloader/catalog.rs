// Format catalog - turns raw variants into a resolution menu
//
// Prefers reliable playback: mp4 container with H.264 video. When no such
// variant exists the menu falls back to every video-capable variant and the
// resolver switches to a container-agnostic expression. The service's
// `/info` lists every video-capable height regardless.

use std::collections::BTreeSet;

use super::models::{EncodingVariant, MediaInfo, ResolutionMenu};

/// Container every video download is normalized to
pub const PRIMARY_CONTAINER: &str = "mp4";

/// Audio container that pairs with the primary container without re-encoding
pub const PRIMARY_AUDIO_CONTAINER: &str = "m4a";

/// Codec tags that identify H.264 video
pub const PREFERRED_CODECS: [&str; 2] = ["avc1", "h264"];

/// Check if a variant is mp4 + H.264
pub fn is_preferred(variant: &EncodingVariant) -> bool {
    variant.ext == PRIMARY_CONTAINER
        && variant
            .vcodec
            .as_deref()
            .is_some_and(|v| PREFERRED_CODECS.iter().any(|c| v.contains(c)))
}

/// Build the resolution menu for a media item
pub fn build_resolution_menu(info: &MediaInfo) -> ResolutionMenu {
    build_menu_from_variants(&info.variants)
}

pub fn build_menu_from_variants(variants: &[EncodingVariant]) -> ResolutionMenu {
    let playable: Vec<&EncodingVariant> = variants
        .iter()
        .filter(|v| v.height.is_some() && v.has_video())
        .collect();

    let preferred: Vec<&EncodingVariant> =
        playable.iter().copied().filter(|v| is_preferred(v)).collect();

    let prefer_primary_codec = !preferred.is_empty();
    let all_heights = unique_descending(&playable);
    let heights = if prefer_primary_codec {
        unique_descending(&preferred)
    } else {
        all_heights.clone()
    };

    ResolutionMenu {
        heights,
        all_heights,
        prefer_primary_codec,
    }
}

fn unique_descending(variants: &[&EncodingVariant]) -> Vec<u32> {
    let unique: BTreeSet<u32> = variants.iter().filter_map(|v| v.height).collect();
    unique.into_iter().rev().collect()
}
