mod common;

use common::Page;
use proptest::prelude::*;
use wysiwyg_web::command::CommandKind;
use wysiwyg_web::engine::Engine;

const SEED: &str = r#"<h2>Title</h2><p>alpha <strong>beta</strong> <a href="/g">gamma</a></p><ul><li><p>one <em>two</em></p></li></ul><blockquote><p>quoted <code>x</code></p></blockquote>"#;

#[derive(Debug, Clone)]
enum Step {
    Select { block: usize, from: usize, to: usize },
    Click(CommandKind),
    Link(Option<String>),
    Type(String),
}

fn step() -> impl Strategy<Value = Step> {
    let immediate = prop::sample::select(
        CommandKind::ALL
            .into_iter()
            .filter(|kind| !matches!(kind, CommandKind::Link | CommandKind::Image))
            .collect::<Vec<_>>(),
    );
    let url = prop_oneof![Just(String::new()), "/[a-z]{1,6}"];
    prop_oneof![
        2 => (0usize..5, 0usize..16, 0usize..16)
            .prop_map(|(block, from, to)| Step::Select { block, from, to }),
        3 => immediate.prop_map(Step::Click),
        1 => prop::option::of(url).prop_map(Step::Link),
        1 => "[a-z ]{1,4}".prop_map(Step::Type),
    ]
}

fn expected(engine: &dyn Engine) -> Vec<CommandKind> {
    CommandKind::ALL
        .into_iter()
        .filter(|kind| (kind.predicate())(engine).unwrap_or(false))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn toolbar_tracks_predicates(steps in prop::collection::vec(step(), 1..24)) {
        let mut page = Page::new();
        let host = page.host("doc", SEED);
        page.append(page.body(), host);
        let discovery = page.start();
        let binding = discovery.bindings()[0].clone();
        let engine = page.engine(0);

        for step in steps {
            match step {
                Step::Select { block, from, to } => engine.select(block, from, to),
                Step::Click(kind) => binding.toolbar.invoke(kind),
                Step::Link(answer) => {
                    match answer {
                        Some(answer) => page.prompt.answer(&answer),
                        None => page.prompt.cancel(),
                    }
                    binding.toolbar.invoke(CommandKind::Link);
                    page.settle();
                    prop_assert!(!binding.toolbar.is_busy());
                }
                Step::Type(text) => engine.insert_text(&text),
            }

            let want = expected(binding.engine.as_ref());
            let labels: Vec<String> = want.iter().map(|kind| kind.label().to_string()).collect();
            prop_assert_eq!(binding.toolbar.state().active_kinds(), want);
            prop_assert_eq!(page.active_titles(&binding), labels);
        }
    }
}
