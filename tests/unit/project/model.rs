use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("a/../../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("C:\\img.png").is_err());
    assert!(normalize_rel_path(" ").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn parses_minimal_project_with_defaults() {
    let json = r#"{
        "version": 1,
        "canvas": { "aspect": "landscape", "definition": 0.5 },
        "layers": [
            { "kind": "image", "source": "bg.png", "geometry": { "scale": 1.2 } },
            { "kind": "text", "content": "Hi", "opacity": 50, "style": { "family": "oswald" } }
        ]
    }"#;
    let def = ProjectDef::from_reader(json.as_bytes()).unwrap();
    def.validate(8).unwrap();
    assert_eq!(def.canvas.canvas().width, 960);
    assert_eq!(def.layers.len(), 2);
    assert_eq!(def.layers[0].kind(), LayerKind::Image);
    assert_eq!(def.layers[0].props.geometry.scale, 1.2);
    assert!(def.layers[0].props.visible);
    assert_eq!(def.layers[1].props.opacity, 50.0);
    match &def.layers[1].content {
        LayerContentDef::Text { content, style } => {
            assert_eq!(content, "Hi");
            assert_eq!(style.size, TextStyle::default().size);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn validate_rejects_bad_projects() {
    let base = ProjectDef {
        version: PROJECT_VERSION,
        canvas: CanvasState::default(),
        layers: Vec::new(),
    };

    let wrong_version = ProjectDef {
        version: 99,
        ..base.clone()
    };
    assert!(wrong_version.validate(8).is_err());

    let bad_definition = ProjectDef {
        canvas: CanvasState {
            definition: 3.0,
            ..CanvasState::default()
        },
        ..base.clone()
    };
    assert!(bad_definition.validate(8).is_err());

    let image = |source: Option<&str>| LayerDef {
        props: LayerProps::default(),
        content: LayerContentDef::Image {
            source: source.map(str::to_owned),
            png: None,
            adjust: AdjustParams::default(),
        },
    };
    let escaping = ProjectDef {
        layers: vec![image(Some("../secret.png"))],
        ..base.clone()
    };
    assert!(escaping.validate(8).unwrap_err().to_string().contains("layers[0]"));
    let empty = ProjectDef {
        layers: vec![image(None)],
        ..base.clone()
    };
    assert!(empty.validate(8).is_err());

    let crowded = ProjectDef {
        layers: vec![image(Some("a.png")); 7],
        ..base
    };
    assert!(matches!(
        crowded.validate(6),
        Err(LaminaError::CapacityExceeded { max: 6 })
    ));
}

#[test]
fn garbage_json_is_a_serde_error() {
    let err = ProjectDef::from_reader("{".as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn serialized_layers_carry_kind_tag() {
    let def = ProjectDef {
        version: PROJECT_VERSION,
        canvas: CanvasState::default(),
        layers: vec![LayerDef {
            props: LayerProps::default(),
            content: LayerContentDef::Text {
                content: "x".into(),
                style: TextStyle::default(),
            },
        }],
    };
    let json = def.to_json_pretty().unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["layers"][0]["kind"], "text");
    assert_eq!(v["layers"][0]["visible"], true);
    assert_eq!(ProjectDef::from_reader(json.as_bytes()).unwrap(), def);
}
