use rematch::{ErrorKind, MatchDiscipline, PatternMatcher, Regex};

fn compiled(pattern: &str, lazy: bool) -> Regex {
    let mut re = Regex::new(pattern);
    re.compile(lazy).unwrap();
    re
}

#[test]
fn log_line_extraction() {
    let mut re = Regex::new("GET /[a-z/]+ HTTP/1\\.[01]");
    re.compile(false).unwrap();
    assert!(re.match_exactly(b"GET /index/about HTTP/1.1"));
    assert!(!re.match_exactly(b"GET /index/about HTTP/2.0"));
    assert_eq!(
        Some(31),
        re.match_anywhere(b"prio9 GET /index/about HTTP/1.0 rest")
    );
}

#[test]
fn whole_string_with_optional_repetition() {
    let re = compiled("ab*c", false);
    assert!(re.match_exactly(b"ac"));
    assert!(re.match_exactly(b"abbbc"));
    assert!(!re.match_exactly(b"abx"));
}

#[test]
fn whole_string_never_matches_proper_substrings() {
    let re = compiled("[0-9]{3}", false);
    assert!(re.match_exactly(b"123"));
    assert!(!re.match_exactly(b"1234"));
    assert!(!re.match_exactly(b"12"));
    assert!(re.is_match(b"1234"));
}

#[test]
fn empty_input() {
    let re = compiled("a*", false);
    assert!(re.match_exactly(b""));
    assert_eq!(Some(0), re.match_anywhere(b""));

    let re = compiled("a+", false);
    assert!(!re.match_exactly(b""));
    assert_eq!(None, re.match_anywhere(b""));
}

#[test]
fn empty_matches_are_postponed() {
    // a pattern that accepts the empty string reports the first nonempty
    // completed occurrence when one exists
    let re = compiled("a*", false);
    assert_eq!(Some(1), re.match_anywhere(b"bbb"));
    assert_eq!(Some(1), re.match_anywhere(b"aab"));
}

#[test]
fn longest_prefix_is_monotonic_in_input() {
    let re = compiled("ab*", false);
    let input = b"abbbx";
    let mut prev = None;
    for n in 0..=input.len() {
        let cur = re.match_prefix_anchored(&input[..n], true, false);
        assert!(cur >= prev, "prefix match shrank at length {}", n);
        prev = cur;
    }
    assert_eq!(Some(4), prev);
}

#[test]
fn prefix_matching_with_fragment_anchoring() {
    let re = compiled("^ab+$", false);
    // a complete subject
    assert_eq!(Some(3), re.match_prefix(b"abb"));
    // a fragment that is not the start of the subject cannot satisfy ^
    assert_eq!(None, re.match_prefix_anchored(b"abb", false, true));
    // a fragment missing the end of the subject cannot satisfy $
    assert_eq!(None, re.match_prefix_anchored(b"abb", true, false));
}

#[test]
fn case_insensitive_matching() {
    let mut re = Regex::new("select|insert|delete");
    re.make_case_insensitive();
    re.compile(false).unwrap();
    assert!(re.match_exactly(b"SELECT"));
    assert!(re.match_exactly(b"Insert"));
    assert!(re.is_match(b"x DELETE y"));
    assert!(!re.is_match(b"update"));
}

#[test]
fn binary_input_is_matched_bytewise() {
    let re = compiled(r"\x00+\xff", false);
    assert!(re.match_exactly(b"\x00\x00\xff"));
    assert_eq!(Some(3), re.match_anywhere(b"a\x00\xffz"));
}

#[test]
fn eager_and_lazy_agree_on_every_operation() {
    let patterns = ["a(b|c)*d", "^x[0-9]+", "foo$", ".*bar.*"];
    let inputs: &[&[u8]] = &[
        b"",
        b"ad",
        b"abcbcd",
        b"x123",
        b"yx123",
        b"a foo",
        b"foo a",
        b"xxbarxx",
    ];
    for pattern in patterns.iter() {
        let eager = compiled(pattern, false);
        let lazy = compiled(pattern, true);
        for input in inputs {
            assert_eq!(
                eager.match_exactly(input),
                lazy.match_exactly(input),
                "match_exactly({:?}, {:?})",
                pattern,
                input
            );
            assert_eq!(
                eager.match_anywhere(input),
                lazy.match_anywhere(input),
                "match_anywhere({:?}, {:?})",
                pattern,
                input
            );
            assert_eq!(
                eager.match_prefix(input),
                lazy.match_prefix(input),
                "match_prefix({:?}, {:?})",
                pattern,
                input
            );
        }
    }
}

#[test]
fn disjunction_is_union() {
    let a = Regex::new("aa+");
    let b = Regex::new("b");
    let mut either = Regex::disjunction(&a, &b);
    either.compile(false).unwrap();
    assert!(either.match_exactly(b"aaa"));
    assert!(either.match_exactly(b"b"));
    assert!(!either.match_exactly(b"a"));
    assert!(either.is_match(b"xxbxx"));
}

#[test]
fn conjunction_requires_both_operands() {
    let a = Regex::new("cat");
    let b = Regex::new("[0-9]+");
    let mut both = Regex::conjunction(&a, &b);
    both.compile(false).unwrap();
    assert!(both.is_match(b"cat 42"));
    assert!(both.is_match(b"9 lives: cat"));
    assert!(!both.is_match(b"cat"));
    assert!(!both.is_match(b"42"));
}

#[test]
fn combinators_are_uncompiled_until_asked() {
    let a = Regex::new("x");
    let b = Regex::new("y");
    let either = Regex::disjunction(&a, &b);
    assert!(!either.is_compiled());
}

#[test]
fn syntax_errors_are_reported() {
    let mut re = Regex::new("a(b");
    let err = re.compile(false).unwrap_err();
    match err.kind() {
        ErrorKind::Syntax(_) => {}
        kind => panic!("expected a syntax error, got {:?}", kind),
    }
    assert!(!re.is_compiled());
}

#[test]
fn unsupported_features_are_reported() {
    let mut re = Regex::new(r"\bword\b");
    let err = re.compile(false).unwrap_err();
    match err.kind() {
        ErrorKind::Unsupported(_) => {}
        kind => panic!("expected an unsupported error, got {:?}", kind),
    }
}

#[test]
fn matcher_reconfiguration_after_failure() {
    let mut m = PatternMatcher::new(MatchDiscipline::WholeString);
    m.set_pattern("a(b");
    assert!(m.compile(false).is_err());
    m.set_pattern("ab");
    m.compile(false).unwrap();
    assert!(m.match_all(b"ab"));
}

quickcheck::quickcheck! {
    fn eager_and_lazy_find_agree(input: Vec<u8>) -> bool {
        let eager = compiled("a[ab]*b", false);
        let lazy = compiled("a[ab]*b", true);
        eager.match_anywhere(&input) == lazy.match_anywhere(&input)
    }
}
