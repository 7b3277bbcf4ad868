use rematch::{MatchDiscipline, PatternMatcher};

fn set_matcher(patterns: &[&str], indices: &[u32], lazy: bool) -> PatternMatcher {
    let mut m = PatternMatcher::new(MatchDiscipline::Substring);
    m.compile_set(patterns, indices, lazy).unwrap();
    m
}

#[test]
fn signature_scan_reports_every_hit() {
    let m = set_matcher(
        &["USER [a-z]+", "PASS [a-z]+", "QUIT"],
        &[10, 20, 30],
        false,
    );
    assert_eq!(vec![10, 20], m.match_set(b"USER anon PASS guest"));
    assert_eq!(vec![30], m.match_set(b"QUIT now"));
    assert!(m.match_set(b"HELP").is_empty());
}

#[test]
fn both_patterns_fire_in_one_scan() {
    let m = set_matcher(&["foo", "bar"], &[1, 2], false);
    assert_eq!(vec![1, 2], m.match_set(b"xxfooyybarzz"));
}

#[test]
fn indices_are_caller_chosen_and_sparse() {
    let m = set_matcher(&["a", "b"], &[7, 1000], false);
    assert_eq!(vec![7, 1000], m.match_set(b"ab"));
    assert_eq!(vec![1000], m.match_set(b"b"));
    assert_eq!(m.pattern_ids(), &[7, 1000]);
}

#[test]
fn one_state_can_accept_several_patterns() {
    // both patterns accept the same subjects, so accepting states carry
    // both indices at once
    let m = set_matcher(&["ab", "a[b]"], &[1, 2], false);
    assert_eq!(vec![1, 2], m.match_set(b"ab"));
}

#[test]
fn containment_does_not_mask_the_inner_pattern() {
    let m = set_matcher(&["abc", "b"], &[1, 2], false);
    assert_eq!(vec![1, 2], m.match_set(b"abc"));
    assert_eq!(vec![2], m.match_set(b"xbx"));
}

#[test]
fn mid_scan_matches_survive_to_the_end() {
    // the pattern stops matching long before the scan ends, but the
    // collected set keeps it
    let m = set_matcher(&["^start", "end$"], &[1, 2], false);
    assert_eq!(vec![1, 2], m.match_set(b"start middle end"));
    assert_eq!(vec![1], m.match_set(b"start middle"));
    assert_eq!(vec![2], m.match_set(b"middle end"));
}

#[test]
fn whole_string_sets() {
    let mut m = PatternMatcher::new(MatchDiscipline::WholeString);
    m.compile_set(&["[0-9]+", "[a-z]+"], &[1, 2], false).unwrap();
    assert_eq!(vec![1], m.match_set(b"123"));
    assert_eq!(vec![2], m.match_set(b"abc"));
    assert!(m.match_set(b"a1").is_empty());
}

#[test]
fn whole_string_sets_ignore_prefix_matches() {
    // [a-z]+ spans a proper prefix of "a1" but not the whole input
    let mut m = PatternMatcher::new(MatchDiscipline::WholeString);
    m.compile_set(&["[0-9]+", "[a-z]+"], &[1, 2], false).unwrap();
    assert!(m.match_set(b"a1").is_empty());
    assert!(m.match_set(b"1a").is_empty());
    assert_eq!(vec![2], m.match_set(b"aa"));
}

#[test]
fn whole_string_sets_ignore_empty_prefix_accepts() {
    // a* accepts the empty prefix at the start of any input, which must
    // not count as matching the whole input
    let mut m = PatternMatcher::new(MatchDiscipline::WholeString);
    m.compile_set(&["a*"], &[1], false).unwrap();
    assert!(m.match_set(b"xyz").is_empty());
    assert_eq!(vec![1], m.match_set(b""));
    assert_eq!(vec![1], m.match_set(b"aaa"));
}

#[test]
fn lazy_sets_agree_with_eager_sets() {
    let patterns = &["foo", "[0-9]{2}", "ba+r"];
    let indices = &[1, 2, 3];
    let eager = set_matcher(patterns, indices, false);
    let lazy = set_matcher(patterns, indices, true);
    for input in
        [&b"foo12baar"[..], b"no digits", b"99", b"br", b""].iter()
    {
        assert_eq!(eager.match_set(input), lazy.match_set(input), "{:?}", input);
    }
}

#[test]
fn reserved_index_is_rejected() {
    let mut m = PatternMatcher::new(MatchDiscipline::Substring);
    let err = m.compile_set(&["a"], &[0], false).unwrap_err();
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn length_mismatch_is_rejected() {
    let mut m = PatternMatcher::new(MatchDiscipline::Substring);
    assert!(m.compile_set(&["a", "b", "c"], &[1, 2], false).is_err());
}
