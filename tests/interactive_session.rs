//! Interactive session driven by scripted answers.

mod common;

use std::sync::Arc;

use common::{catalog_without_preferred_codec, variant, ScriptedExtractor, ScriptedInput};
use tube_fetch::cli::{exit_code_for, InteractiveSession, SessionOutcome};
use tube_fetch::downloader::models::PostProcess;
use tube_fetch::downloader::DownloadError;

fn session(
    fake: &Arc<ScriptedExtractor>,
    dir: &tempfile::TempDir,
    answers: &[&str],
) -> (InteractiveSession, Arc<ScriptedInput>) {
    let input = Arc::new(ScriptedInput::new(answers));
    let session = InteractiveSession::new(common::orchestrator(fake, dir.path()), input.clone())
        .with_progress_bar(false);
    (session, input)
}

#[tokio::test]
async fn quick_download_is_named_after_title() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo Clip", catalog_without_preferred_codec()));
    let (session, _) = session(&fake, &dir, &["https://example.com/v", "1"]);

    let outcome = session.run().await.unwrap();

    let SessionOutcome::Completed(artifact) = outcome else {
        panic!("expected a completed download");
    };
    assert_eq!(artifact.path, dir.path().join("Demo Clip.mp4"));
    assert!(artifact.path.exists());
    assert_eq!(artifact.title.as_deref(), Some("Demo Clip"));
    // The session fetched info once for the menu; the download reuses it
    assert_eq!(fake.info_calls(), 1);
}

#[tokio::test]
async fn manual_resolution_uses_selected_height() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new(
        "Demo",
        vec![
            variant("137", "mp4", Some(1080), "avc1.640028"),
            variant("136", "mp4", Some(720), "avc1.4d401f"),
        ],
    ));
    let (session, input) = session(&fake, &dir, &["https://example.com/v", "2", "2", "y"]);

    let outcome = session.run().await.unwrap();

    assert!(matches!(outcome, SessionOutcome::Completed(_)));
    let options = fake.last_options().unwrap();
    assert_eq!(
        options.format,
        "bestvideo[ext=mp4][vcodec*=avc1][height<=720]+bestaudio[ext=m4a]/best[ext=mp4]"
    );
    assert!(input.prompts().contains(&"Download at 720p? (y/n): ".to_string()));
    assert_eq!(fake.info_calls(), 1);
}

#[tokio::test]
async fn invalid_choices_are_asked_again() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo", catalog_without_preferred_codec()));
    let (session, input) = session(
        &fake,
        &dir,
        &["https://example.com/v", "7", "two", "2", "0", "9", "3", "y"],
    );

    session.run().await.unwrap();

    let prompts = input.prompts();
    assert_eq!(prompts.iter().filter(|p| p.as_str() == "Enter 1/2/3: ").count(), 3);
    assert_eq!(
        prompts
            .iter()
            .filter(|p| p.starts_with("Select resolution number"))
            .count(),
        3
    );
    // Third entry of [1080, 720, 480]
    assert_eq!(
        fake.last_options().unwrap().format,
        "bestvideo[height<=480]+bestaudio/best"
    );
}

#[tokio::test]
async fn declining_confirmation_cancels_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo", catalog_without_preferred_codec()));
    let (session, _) = session(&fake, &dir, &["https://example.com/v", "2", "1", "n"]);

    let outcome = session.run().await.unwrap();

    assert!(matches!(outcome, SessionOutcome::Cancelled));
    assert_eq!(fake.download_calls(), 0);
}

#[tokio::test]
async fn audio_only_extracts_mp3() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Song", catalog_without_preferred_codec()));
    let (session, _) = session(&fake, &dir, &["https://example.com/v", "3"]);

    let SessionOutcome::Completed(artifact) = session.run().await.unwrap() else {
        panic!("expected a completed download");
    };

    assert_eq!(artifact.file_name(), "Song.mp3");
    assert!(matches!(
        fake.last_options().unwrap().post_process,
        PostProcess::ExtractAudio { codec: "mp3", .. }
    ));
}

#[tokio::test]
async fn non_http_url_is_a_validation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo", vec![]));
    let (session, _) = session(&fake, &dir, &["www.example.com/v"]);

    let err = session.run().await.unwrap_err();

    assert!(matches!(err, DownloadError::Validation(_)));
    assert_eq!(exit_code_for(&err), 2);
    assert_eq!(fake.info_calls(), 0);
}

#[tokio::test]
async fn empty_menu_fails_manual_selection() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo", vec![]));
    let (session, _) = session(&fake, &dir, &["https://example.com/v", "2"]);

    let err = session.run().await.unwrap_err();

    assert!(matches!(err, DownloadError::NoPlayableVariant));
    assert_eq!(exit_code_for(&err), 1);
}

#[tokio::test]
async fn transfer_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(
        ScriptedExtractor::new("Demo", vec![]).failing_transfer("ERROR: unable to download video data: HTTP Error 403: Forbidden"),
    );
    let (session, _) = session(&fake, &dir, &["https://example.com/v", "1"]);

    let err = session.run().await.unwrap_err();

    assert!(matches!(err, DownloadError::Transfer { .. }));
    assert_eq!(exit_code_for(&err), 1);
}

#[tokio::test]
async fn closed_input_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(ScriptedExtractor::new("Demo", vec![]));
    let (session, _) = session(&fake, &dir, &["https://example.com/v"]);

    let err = session.run().await.unwrap_err();

    assert!(matches!(err, DownloadError::Io(_)));
}
