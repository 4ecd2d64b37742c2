use farefinder::airport::{AirportResolver, CITY_AIRPORTS};

#[test]
fn three_letter_codes_pass_through_uppercased() {
    let resolver = AirportResolver::default();
    for input in ["jfk", "NRT", "hEl", "zzz", "QQQ", " lhr "] {
        assert_eq!(
            resolver.resolve(input),
            Some(input.trim().to_ascii_uppercase()),
            "{input}"
        );
    }
}

#[test]
fn every_table_city_resolves_to_its_first_code() {
    let resolver = AirportResolver::default();
    for (city, codes) in CITY_AIRPORTS {
        assert_eq!(resolver.resolve(city).as_deref(), Some(codes[0]), "{city}");
    }
}

#[test]
fn city_names_are_case_insensitive() {
    let resolver = AirportResolver::default();
    assert_eq!(resolver.resolve("New York").as_deref(), Some("JFK"));
    assert_eq!(resolver.resolve("TOKYO").as_deref(), Some("NRT"));
}

#[test]
fn input_containing_city_name_matches() {
    let resolver = AirportResolver::default();
    assert_eq!(resolver.resolve("New York City").as_deref(), Some("JFK"));
    assert_eq!(resolver.resolve("London, UK").as_deref(), Some("LHR"));
}

#[test]
fn partial_city_name_matches() {
    let resolver = AirportResolver::default();
    assert_eq!(resolver.resolve("san fran").as_deref(), Some("SFO"));
    assert_eq!(resolver.resolve("Barcel").as_deref(), Some("BCN"));
}

#[test]
fn unknown_and_empty_inputs() {
    let resolver = AirportResolver::default();
    assert_eq!(resolver.resolve("Atlantis"), None);
    assert_eq!(resolver.resolve(""), None);
    assert_eq!(resolver.resolve("   "), None);
}

#[test]
fn first_table_entry_wins_ambiguous_matches() {
    static TABLE: &[(&str, &[&str])] = &[("venice", &["VCE"]), ("nice", &["NCE"])];
    let resolver = AirportResolver::with_table(TABLE);
    // "nice" is contained in "venice", which comes first.
    assert_eq!(resolver.resolve("Nice").as_deref(), Some("VCE"));
    assert_eq!(resolver.resolve("Venice").as_deref(), Some("VCE"));
}

#[test]
fn candidates_list_all_codes() {
    let resolver = AirportResolver::default();
    let (city, codes) = resolver.candidates("new york").unwrap();
    assert_eq!(city, "new york");
    assert_eq!(codes, vec!["JFK", "LGA", "EWR"]);

    let (code, codes) = resolver.candidates("hnd").unwrap();
    assert_eq!(code, "HND");
    assert_eq!(codes, vec!["HND"]);

    assert!(resolver.candidates("Atlantis").is_none());
}
