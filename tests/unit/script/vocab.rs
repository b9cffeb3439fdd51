use super::*;

#[test]
fn stem_strips_one_suffix_then_tidies() {
    assert_eq!(stem("walks"), "walk");
    assert_eq!(stem("walking"), "walk");
    assert_eq!(stem("waddle"), "waddl");
    assert_eq!(stem("waddles"), "waddl");
    assert_eq!(stem("waddling"), "waddl");
    assert_eq!(stem("hopping"), "hop");
    assert_eq!(stem("spinning"), "spin");
    assert_eq!(stem("rolling"), "roll");
    assert_eq!(stem("celebrating"), "celebrat");
    assert_eq!(stem("celebrate"), "celebrat");
}

#[test]
fn stem_keeps_short_words() {
    assert_eq!(stem("is"), "is");
    assert_eq!(stem("die"), "die");
    assert_eq!(stem("as"), "as");
    assert_eq!(stem("hop"), "hop");
}

#[test]
fn builtin_compiles_and_matches_inflections() {
    let v = Vocabulary::builtin().compile().unwrap();
    assert_eq!(v.action("waddling"), Some(ActionKind::Walk));
    assert_eq!(v.action("hops"), Some(ActionKind::Jump));
    assert_eq!(v.action("flies"), Some(ActionKind::Fly));
    assert_eq!(v.action("celebrating"), Some(ActionKind::Cheer));
    assert_eq!(v.action("tumbles"), Some(ActionKind::Roll));
    assert_eq!(v.action("duckling"), None);
    assert_eq!(v.object("dice"), Some(ObjectKind::Dice));
    assert_eq!(v.object("die"), Some(ObjectKind::Dice));
    assert_eq!(v.object("sparkles"), Some(ObjectKind::Star));
    assert_eq!(v.object("start"), None);
    assert_eq!(v.emotion("happy"), Some(Emotion::Happy));
    assert!(v.is_connective("then"));
    assert!(!v.is_connective("is"));
    assert_eq!(v.outcome("wins"), Some(true));
    assert_eq!(v.outcome("fails"), Some(false));
    assert_eq!(v.outcome("rolls"), None);
    assert_eq!(v.fallback_action(), ActionKind::Idle);
}

#[test]
fn numeric_patterns_capture_digits() {
    let v = Vocabulary::builtin().compile().unwrap();
    let caps: Vec<&str> = v.numeric_captures("result is 6").collect();
    assert_eq!(caps, vec!["6"]);
    let caps: Vec<&str> = v.numeric_captures("it lands on a 4").collect();
    assert_eq!(caps, vec!["4"]);
    assert_eq!(v.numeric_captures("rolls dice").count(), 0);
}

#[test]
fn bad_tables_are_config_errors() {
    let mut v = Vocabulary::builtin();
    v.numeric_patterns = vec!["(unclosed".to_string()];
    let err = v.compile().unwrap_err();
    assert!(matches!(err, ToonError::Config(_)));

    let mut v = Vocabulary::builtin();
    v.numeric_patterns = vec![r"result \d+".to_string()];
    assert!(v.compile().is_err());

    let mut v = Vocabulary::builtin();
    v.actions.clear();
    assert!(v.compile().is_err());

    let mut v = Vocabulary::builtin();
    v.objects[0].forms = vec!["  ".to_string()];
    assert!(v.compile().is_err());
}

#[test]
fn partial_json_falls_back_to_builtin_fields() {
    let json = r#"{"fallback_action": "cheer", "success_words": ["nailed"]}"#;
    let v = Vocabulary::from_reader(json.as_bytes()).unwrap();
    assert_eq!(v.fallback_action, ActionKind::Cheer);
    assert_eq!(v.success_words, vec!["nailed".to_string()]);
    assert_eq!(v.actions, Vocabulary::builtin().actions);
    assert_eq!(v.version, BUILTIN_VOCABULARY_VERSION);
}

#[test]
fn malformed_json_is_config_error() {
    let err = Vocabulary::from_reader("{".as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
    assert!(Vocabulary::from_path("/definitely/not/here.json").is_err());
}
