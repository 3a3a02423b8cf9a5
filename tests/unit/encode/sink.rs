use super::*;

#[test]
fn quality_presets_trade_scale_for_speed() {
    assert_eq!(QualityPreset::default(), QualityPreset::Standard);
    assert_eq!(QualityPreset::Draft.scale(), 0.5);
    assert_eq!(QualityPreset::Standard.scale(), 0.75);
    assert_eq!(QualityPreset::High.scale(), 1.0);
    assert!(QualityPreset::Draft.encoder_speed() > QualityPreset::High.encoder_speed());
}

#[test]
fn quality_preset_names_are_lowercase() {
    let q: QualityPreset = serde_json::from_str("\"draft\"").unwrap();
    assert_eq!(q, QualityPreset::Draft);
    assert_eq!(serde_json::to_string(&QualityPreset::High).unwrap(), "\"high\"");
}

#[test]
fn in_memory_sink_captures_config_and_frames() {
    let mut sink = InMemorySink::new();
    assert!(sink.config().is_none());
    let cfg = SinkConfig {
        width: 2,
        height: 1,
        quality: QualityPreset::High,
        loop_count: 0,
    };
    sink.begin(cfg).unwrap();
    sink.push_frame(&RgbaImage::new(2, 1), 67).unwrap();
    sink.push_frame(&RgbaImage::new(2, 1), 67).unwrap();

    let mut last = 0.0;
    let bytes = sink.finish(&mut |p| last = p).unwrap();
    assert!(bytes.is_empty());
    assert_eq!(last, 1.0);
    assert_eq!(sink.config(), Some(cfg));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].1, 67);

    sink.begin(cfg).unwrap();
    assert!(sink.frames().is_empty());
}
