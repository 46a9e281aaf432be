use nebula_editor_core::{
    AiAction, AiRewriter, AppState, Command, DocumentStore, Effect, ExportKind, Exporter, Key,
    KeyCombo, Keymap, MarkdownFileExporter, MemoryStore, RewriteError, RewriteRequest, Selection,
    request_rewrite,
};
use web_time::Instant;

struct Shouty;

impl AiRewriter for Shouty {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
        Ok(request.text.to_uppercase())
    }
}

/// Carry out effects the way an embedding shell would.
async fn perform(
    app: &mut AppState,
    effect: Effect,
    store: &impl DocumentStore,
    exporter: &impl Exporter,
) {
    let now = Instant::now();
    match effect {
        Effect::None | Effect::Select(_) => {}
        Effect::Save(text) => store.save(&text).unwrap(),
        Effect::Export(kind, text) => {
            let result = exporter.export(kind, &text);
            app.finish_export(kind, result, now);
        }
        Effect::Rewrite(request) => {
            let result = request_rewrite(&Shouty, &request).await;
            app.finish_rewrite(result, now);
        }
    }
}

#[tokio::test]
async fn test_editing_session() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let exporter = MarkdownFileExporter::new(dir.path());
    let keymap = Keymap::new(false);

    let mut app = AppState::new(store.load().unwrap());
    assert!(app.text().starts_with("# Welcome to Nebula"));

    app.update(Command::Edit("one\ntwo".into()));
    app.update(Command::Select(Selection::new(0, 7)));
    let list = keymap.resolve(&KeyCombo::primary(Key::character("l"), false)).unwrap();
    let effect = app.update(list);
    assert_eq!(effect, Effect::Select(0..11));
    insta::assert_snapshot!(app.text(), @r"
    - one
    - two
    ");

    let save = keymap.resolve(&KeyCombo::primary(Key::character("s"), false)).unwrap();
    let effect = app.update(save);
    perform(&mut app, effect, &store, &exporter).await;
    assert_eq!(store.load().unwrap(), "- one\n- two");

    let effect = app.update(Command::RequestAi(AiAction::FixGrammar));
    perform(&mut app, effect, &store, &exporter).await;
    assert_eq!(app.text(), "- ONE\n- TWO");
    assert_eq!(app.status(Instant::now()), Some("AI operation complete."));

    let effect = app.update(Command::Export(ExportKind::Markdown));
    perform(&mut app, effect, &store, &exporter).await;
    assert_eq!(
        std::fs::read_to_string(dir.path().join("document.md")).unwrap(),
        "- ONE\n- TWO"
    );
    assert_eq!(
        app.status(Instant::now()),
        Some("Document exported successfully.")
    );
}

#[test]
fn test_find_then_replace_all() {
    let mut app = AppState::new("Nebula nebula NEBULA");
    app.update(Command::ToggleSearch);
    app.update(Command::SetQuery("nebula".into()));
    assert_eq!(app.search().matches().len(), 3);

    app.update(Command::SetReplacement("Orion".into()));
    app.update(Command::ReplaceAll);
    assert_eq!(app.text(), "Orion Orion Orion");

    app.update(Command::SetQuery("nebula".into()));
    assert!(app.search().matches().is_empty());
    assert_eq!(app.update(Command::NextMatch), Effect::None);
}
