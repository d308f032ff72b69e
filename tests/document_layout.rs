//! End-to-end tests: TOML document in, laid-out document out

use pretty_assertions::assert_eq;

use seqlayout::layout::{row_layout, RowConfig};
use seqlayout::{layout_with_config, Graph, GraphDocument, LaidOutDocument, SequenceConfig};

const CHECKOUT: &str = r#"
[[objects]]
path = "shop"
shape = "sequence_diagram"

[[objects]]
path = "shop.client"
shape = "person"
width = 80.0
height = 80.0

[[objects]]
path = "shop.api"
width = 120.0
height = 50.0

[[objects]]
path = "shop.api.handler"

[[objects]]
path = "billing"
width = 100.0
height = 60.0

[[edges]]
from = "shop.client"
to = "shop.api.handler"
label = "POST /checkout"

[[edges]]
from = "shop.api.handler"
to = "shop.client"
label = "201 Created"

[[edges]]
from = "shop"
to = "billing"
"#;

fn lay_out(config: &SequenceConfig) -> LaidOutDocument {
    let mut graph = GraphDocument::from_toml_str(CHECKOUT)
        .unwrap()
        .to_graph()
        .unwrap();
    let row = RowConfig::default();
    layout_with_config(&mut graph, config, &mut |g: &mut Graph| row_layout(g, &row)).unwrap();
    LaidOutDocument::from_graph(&graph)
}

#[test]
fn test_roles_and_kinds() {
    let doc = lay_out(&SequenceConfig::default());
    let roles: Vec<(&str, &str)> = doc
        .objects
        .iter()
        .map(|o| (o.path.as_str(), o.role.as_str()))
        .collect();
    assert_eq!(
        roles,
        vec![
            ("shop", "sequence_diagram"),
            ("shop.client", "actor"),
            ("shop.api", "actor"),
            ("shop.api.handler", "span"),
            ("billing", "plain"),
        ]
    );

    let kinds: Vec<&str> = doc.edges.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec!["message", "message", "connection", "lifeline", "lifeline"]
    );
    assert!(doc.objects.iter().all(|o| o.x.is_some() && o.y.is_some()));
}

#[test]
fn test_toml_output() {
    let text = lay_out(&SequenceConfig::default())
        .to_toml_string()
        .unwrap();
    assert!(text.contains("path = \"shop.api.handler\""));
    assert!(text.contains("label_position = \"outside-top-center\""));
    assert!(text.contains("label_position = \"outside-bottom-center\""));
    assert!(text.contains("kind = \"lifeline\""));
}

#[test]
fn test_config_changes_spacing() {
    let narrow = lay_out(&SequenceConfig::default().with_actor_spacing(20.0));
    let wide = lay_out(&SequenceConfig::default().with_actor_spacing(200.0));
    let width = |doc: &LaidOutDocument| {
        doc.objects
            .iter()
            .find(|o| o.path == "shop")
            .map(|o| o.width)
            .unwrap()
    };
    assert_eq!(width(&wide) - width(&narrow), 180.0);
}

#[test]
fn test_config_from_toml() {
    let config = SequenceConfig::from_toml_str("actor_spacing = 20.0\nmessage_spacing = 60.0\n").unwrap();
    assert_eq!(config.actor_spacing, 20.0);
    assert_eq!(config.message_spacing, 60.0);
    assert_eq!(config.lifeline_margin, SequenceConfig::default().lifeline_margin);
}
