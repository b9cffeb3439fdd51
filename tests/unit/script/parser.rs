use super::*;

fn kinds(plan: &ActionPlan) -> Vec<ActionKind> {
    plan.actions().iter().map(|a| a.kind).collect()
}

#[test]
fn walk_then_jump_keeps_source_order() {
    let plan = parse("duckling walks then jumps");
    assert_eq!(kinds(&plan), vec![ActionKind::Walk, ActionKind::Jump]);
}

#[test]
fn dice_result_binds_to_preceding_action() {
    let plan = parse("duckling rolls dice and jumps cheering as result is 6");
    assert_eq!(kinds(&plan), vec![ActionKind::Roll, ActionKind::Jump]);

    let jump = plan
        .actions()
        .iter()
        .position(|a| a.kind == ActionKind::Jump)
        .unwrap();
    let with_result = plan
        .actions()
        .iter()
        .position(|a| a.condition == Some(Condition::NumericResult(6)))
        .unwrap();
    assert!(with_result <= jump);
    assert!(plan.actions()[0].has_object(ObjectKind::Dice));
}

#[test]
fn any_input_gives_a_non_empty_plan() {
    for text in ["", "   ", ",,,", "the quick brown fox", "12345", "ünïcödé ✨"] {
        let plan = parse(text);
        assert!(!plan.actions().is_empty(), "{text:?}");
    }
    assert_eq!(kinds(&parse("")), vec![ActionKind::Idle]);
}

#[test]
fn modifier_clause_merges_into_previous_action() {
    let plan = parse("bird flies, happy with a coin");
    assert_eq!(kinds(&plan), vec![ActionKind::Fly]);
    let fly = &plan.actions()[0];
    assert_eq!(fly.emotion, Some(Emotion::Happy));
    assert!(fly.has_object(ObjectKind::Coin));
}

#[test]
fn leading_modifiers_prefer_an_idle_like_action() {
    let plan = parse("with a heart, duck jumps then blinks");
    assert_eq!(
        kinds(&plan),
        vec![ActionKind::Jump, ActionKind::Blink]
    );
    assert!(plan.actions()[1].has_object(ObjectKind::Heart));
    assert!(!plan.actions()[0].has_object(ObjectKind::Heart));
}

#[test]
fn leading_modifiers_without_idle_get_a_fallback_action() {
    let plan = parse("a star, then walking");
    assert_eq!(kinds(&plan), vec![ActionKind::Idle, ActionKind::Walk]);
    assert!(plan.actions()[0].has_object(ObjectKind::Star));
}

#[test]
fn unrecognized_clauses_are_ignored() {
    let plan = parse("once upon a time, the duck walks");
    assert_eq!(kinds(&plan), vec![ActionKind::Walk]);
}

#[test]
fn oversized_numbers_are_dropped() {
    let plan = parse("rolls dice and result is 123456");
    assert_eq!(plan.actions()[0].condition, None);
    let plan = parse("rolls dice and result is 99999999999999999999");
    assert_eq!(plan.actions()[0].condition, None);
}

#[test]
fn first_condition_wins() {
    let plan = parse("rolls dice, result is 3, then it shows 5");
    assert_eq!(
        plan.actions()[0].condition,
        Some(Condition::NumericResult(3))
    );
}

#[test]
fn outcome_words_set_flags() {
    let plan = parse("duck jumps and wins");
    assert_eq!(plan.actions()[0].condition, Some(Condition::OutcomeFlag(true)));
    let plan = parse("duck jumps and fails");
    assert_eq!(plan.actions()[0].condition, Some(Condition::OutcomeFlag(false)));
}

#[test]
fn duplicate_objects_collapse_and_seeds_differ() {
    let plan = parse("rolls dice and a die with a coin and a star");
    let roll = &plan.actions()[0];
    assert_eq!(roll.objects.len(), 3);
    let mut seeds: Vec<u64> = roll.objects.iter().map(|o| o.params_seed).collect();
    seeds.dedup();
    assert_eq!(seeds.len(), 3);
}

#[test]
fn parse_is_deterministic() {
    let text = "duckling rolls dice and jumps cheering as result is 6";
    assert_eq!(parse(text), parse(text));
}

#[test]
fn custom_vocabulary_changes_fallback() {
    let mut vocab = Vocabulary::builtin();
    vocab.fallback_action = ActionKind::Cheer;
    let parser = Parser::new(&vocab).unwrap();
    assert_eq!(kinds(&parser.parse("nothing here")), vec![ActionKind::Cheer]);
}

#[test]
fn second_action_word_in_clause_can_be_an_emotion() {
    let plan = parse("duck jumps excited");
    assert_eq!(kinds(&plan), vec![ActionKind::Jump]);
    assert_eq!(plan.actions()[0].emotion, Some(Emotion::Excited));
}

#[test]
fn apostrophes_do_not_split_words() {
    let toks = tokenize("Duck's jump, then");
    assert_eq!(
        toks,
        vec![
            Token::Word("ducks".into()),
            Token::Word("jump".into()),
            Token::Break,
            Token::Word("then".into()),
        ]
    );
}
