use mathsolver::export::{paginate, PageLayout};
use mathsolver::{export_pdf, ExportError, Sender, Transcript};

fn long_transcript() -> Transcript {
    let mut transcript = Transcript::new();
    for i in 0..40 {
        transcript.append(Sender::User, format!("{i} + {i} = ?"));
        transcript.append(Sender::Ai, format!("<b>Step 1:</b> add<br>Answer: {}", i + i));
    }
    transcript
}

#[test]
fn multi_page_transcript_exports_every_line_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_history.pdf");
    let text = long_transcript().render_plain_text();

    let summary = export_pdf(&text, &path).unwrap();

    assert!(summary.pages > 1);
    assert_eq!(summary.lines, text.lines().count());

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let pages = paginate(&text, &PageLayout::default());
    assert_eq!(pages.len(), summary.pages);
    let placed: Vec<&str> = pages.iter().flatten().map(|l| l.text).collect();
    assert_eq!(placed, text.lines().collect::<Vec<_>>());
}

#[test]
fn cleared_transcript_is_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_history.pdf");
    let mut transcript = long_transcript();

    transcript.clear();
    let text = transcript.render_plain_text();

    assert_eq!(text, "");
    assert!(matches!(export_pdf(&text, &path), Err(ExportError::EmptyTranscript)));
    assert!(!path.exists());
}

#[test]
fn unwritable_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("chat_history.pdf");

    let err = export_pdf("You: 1 + 1\nAI: 2", &path).unwrap_err();

    assert!(matches!(err, ExportError::Io { .. }));
}
