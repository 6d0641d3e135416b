use mention_suggest::fuzzy::{MatchOptions, MatchStrategy};
use mention_suggest::ranking::{ranked_order, RankLimits, RankingPipeline};
use mention_suggest::{Lookup, MentionEntry, RankedItem};

fn entries(keys: &[&str]) -> Vec<MentionEntry> {
    keys.iter().map(|k| MentionEntry::new(*k, k.to_lowercase())).collect()
}

fn rank(query: &str, items: &[MentionEntry], limits: RankLimits) -> Vec<RankedItem<MentionEntry>> {
    RankingPipeline::new().rank(
        query,
        items,
        &Lookup::default(),
        &MatchOptions::default(),
        limits,
    )
}

fn keys(ranked: &[RankedItem<MentionEntry>]) -> Vec<&str> {
    ranked.iter().map(|r| r.original.key.as_str()).collect()
}

#[test]
fn contiguous_matches_rank_first() {
    let items = entries(&["Amazon", "Alabama", "Annapolis"]);
    let ranked = rank("an", &items, RankLimits::default());
    assert_eq!(keys(&ranked), vec!["Annapolis", "Amazon"]);
    assert_eq!(ranked[0].score, 3);
    assert_eq!(ranked[0].source_index, 2);
}

#[test]
fn equal_scores_keep_source_order() {
    let items = entries(&["Joachim", "Sir Walter", "Jordan"]);
    let ranked = rank("jo", &items, RankLimits::default());
    assert_eq!(keys(&ranked), vec!["Joachim", "Jordan"]);
    assert_eq!(ranked[0].score, ranked[1].score);
}

#[test]
fn sorting_twice_changes_nothing() {
    let items = entries(&["banana", "bandana", "cabana", "ban"]);
    let mut ranked = rank("ban", &items, RankLimits::default());
    let first = ranked.clone();
    ranked.sort_by(ranked_order);
    assert_eq!(ranked, first);
}

#[test]
fn skip_keeps_every_candidate_in_order() {
    let items = entries(&["zeta", "alpha", "mu"]);
    let opts = MatchOptions {
        skip: true,
        ..MatchOptions::default()
    };
    let ranked = RankingPipeline::new().rank(
        "nothing matches this",
        &items,
        &Lookup::default(),
        &opts,
        RankLimits::default(),
    );
    assert_eq!(keys(&ranked), vec!["zeta", "alpha", "mu"]);
    assert!(ranked.iter().all(|r| r.score == 0 && r.rendered_label == r.original.key));
}

#[test]
fn result_limit_truncates_after_sorting() {
    let items = entries(&["Amazon", "Annapolis", "Andes"]);
    let ranked = rank(
        "an",
        &items,
        RankLimits {
            result_limit: Some(2),
            ..RankLimits::default()
        },
    );
    assert_eq!(keys(&ranked), vec!["Annapolis", "Andes"]);
}

#[test]
fn max_candidates_caps_what_is_considered() {
    let items = entries(&["Amazon", "Andes", "Annapolis"]);
    let ranked = rank(
        "an",
        &items,
        RankLimits {
            max_candidates: Some(2),
            ..RankLimits::default()
        },
    );
    assert_eq!(keys(&ranked), vec!["Andes", "Amazon"]);
}

#[test]
fn zero_limits_mean_unlimited() {
    let items = entries(&["Amazon", "Annapolis", "Andes"]);
    let unlimited = rank("an", &items, RankLimits::default());
    let zeroed = rank(
        "an",
        &items,
        RankLimits {
            max_candidates: Some(0),
            result_limit: Some(0),
        },
    );
    assert_eq!(zeroed.len(), 3);
    assert_eq!(zeroed, unlimited);
}

#[test]
fn computed_lookup_and_missing_fields() {
    let items = entries(&["Jordan"]);
    let by_value = Lookup::computed(|e: &MentionEntry, _q: &str| format!("{}!", e.value));
    let ranked = RankingPipeline::new().rank(
        "n!",
        &items,
        &by_value,
        &MatchOptions::default(),
        RankLimits::default(),
    );
    assert_eq!(ranked[0].rendered_label, "jordan!");

    let missing: Lookup<MentionEntry> = Lookup::field("email");
    let ranked = RankingPipeline::new().rank(
        "",
        &items,
        &missing,
        &MatchOptions::default(),
        RankLimits::default(),
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rendered_label, "");
}

#[test]
fn json_values_rank_by_field() {
    let items = vec![
        serde_json::json!({"key": "Phil Heartman", "value": "pheartman"}),
        serde_json::json!({"key": "Gordon Ramsey", "value": "gramsey"}),
    ];
    let ranked = RankingPipeline::new().rank(
        "ph",
        &items,
        &Lookup::default(),
        &MatchOptions::default(),
        RankLimits::default(),
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].original["value"], "pheartman");
}

#[test]
fn skim_strategy_filters_and_orders() {
    let items = entries(&["xjxoxx", "John", "Mary"]);
    let opts = MatchOptions {
        strategy: MatchStrategy::Skim,
        ..MatchOptions::default()
    };
    let ranked = RankingPipeline::new().rank(
        "jo",
        &items,
        &Lookup::default(),
        &opts,
        RankLimits::default(),
    );
    assert_eq!(keys(&ranked), vec!["John", "xjxoxx"]);
}
