use chrono::NaiveDate;
use farefinder::error::FlightError;
use farefinder::query::{parse_date, SearchInput, SearchRequest, TravelClass, TripType};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

fn make_valid_input() -> SearchInput {
    SearchInput {
        origin: "JFK".into(),
        destination: "NRT".into(),
        departure_date: "2025-12-25".into(),
        ..Default::default()
    }
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn valid_input_builds() {
    let req = SearchRequest::build(&make_valid_input(), today()).unwrap();
    assert_eq!(req.origin, "JFK");
    assert_eq!(req.destination, "NRT");
    assert_eq!(req.trip_type(), TripType::OneWay);
    assert_eq!(req.passengers.adults, 1);
    assert_eq!(req.currency, "USD");
}

#[test]
fn one_way_params() {
    let req = SearchRequest::build(&make_valid_input(), today()).unwrap();
    let params = req.to_url_params();
    assert_eq!(param(&params, "engine"), Some("google_flights"));
    assert_eq!(param(&params, "departure_id"), Some("JFK"));
    assert_eq!(param(&params, "arrival_id"), Some("NRT"));
    assert_eq!(param(&params, "outbound_date"), Some("2025-12-25"));
    assert_eq!(param(&params, "type"), Some("2"));
    assert_eq!(param(&params, "return_date"), None);
    assert_eq!(param(&params, "travel_class"), None);
    assert_eq!(param(&params, "api_key"), None);
}

#[test]
fn round_trip_params_include_both_dates() {
    let mut input = make_valid_input();
    input.return_date = Some("2026-01-05".into());
    let req = SearchRequest::build(&input, today()).unwrap();
    assert_eq!(req.trip_type(), TripType::RoundTrip);

    let params = req.to_url_params();
    assert_eq!(param(&params, "type"), Some("1"));
    assert_eq!(param(&params, "outbound_date"), Some("2025-12-25"));
    assert_eq!(param(&params, "return_date"), Some("2026-01-05"));
}

#[test]
fn api_key_is_added_only_on_request() {
    let req = SearchRequest::build(&make_valid_input(), today()).unwrap();
    let params = req.to_url_params_with_key("k-123");
    assert_eq!(param(&params, "api_key"), Some("k-123"));
}

#[test]
fn rejects_non_exact_date_formats() {
    for bad in [
        "2025-12-5",
        "2025-1-05",
        "25-12-05",
        "12/25/2025",
        "2025/12/25",
        "20251225",
        "2025-12-25 ",
        "next friday",
        "",
    ] {
        let mut input = make_valid_input();
        input.departure_date = bad.into();
        assert!(
            matches!(
                SearchRequest::build(&input, today()),
                Err(FlightError::InvalidDate(_))
            ),
            "{bad:?}"
        );
        assert!(parse_date(bad).is_err(), "{bad:?}");
    }
}

#[test]
fn rejects_impossible_calendar_dates() {
    for bad in ["2026-02-30", "2026-04-31", "2026-13-01", "2026-00-10", "2026-02-29"] {
        assert!(parse_date(bad).is_err(), "{bad}");
    }
    assert!(parse_date("2028-02-29").is_ok());
}

#[test]
fn rejects_past_departure() {
    let mut input = make_valid_input();
    input.departure_date = "2025-10-31".into();
    assert!(matches!(
        SearchRequest::build(&input, today()),
        Err(FlightError::DateInPast(_))
    ));
}

#[test]
fn accepts_departure_today() {
    let mut input = make_valid_input();
    input.departure_date = "2025-11-01".into();
    assert!(SearchRequest::build(&input, today()).is_ok());
}

#[test]
fn rejects_return_on_or_before_departure() {
    for ret in ["2025-12-25", "2025-12-24", "2025-12-01"] {
        let mut input = make_valid_input();
        input.return_date = Some(ret.into());
        assert!(
            matches!(
                SearchRequest::build(&input, today()),
                Err(FlightError::ReturnBeforeDeparture { .. })
            ),
            "{ret}"
        );
    }
}

#[test]
fn blank_return_date_means_one_way() {
    let mut input = make_valid_input();
    input.return_date = Some("  ".into());
    let req = SearchRequest::build(&input, today()).unwrap();
    assert_eq!(req.trip_type(), TripType::OneWay);
}

#[test]
fn travel_class_maps_to_ordinal() {
    for (name, ordinal) in [
        ("economy", "1"),
        ("premium_economy", "2"),
        ("business", "3"),
        ("first", "4"),
    ] {
        let mut input = make_valid_input();
        input.travel_class = Some(name.into());
        let req = SearchRequest::build(&input, today()).unwrap();
        assert_eq!(param(&req.to_url_params(), "travel_class"), Some(ordinal));
    }
}

#[test]
fn unknown_travel_class_is_rejected() {
    let mut input = make_valid_input();
    input.travel_class = Some("coach".into());
    assert!(matches!(
        SearchRequest::build(&input, today()),
        Err(FlightError::InvalidTravelClass(_))
    ));
}

#[test]
fn default_travel_class_is_economy() {
    let req = SearchRequest::build(&make_valid_input(), today()).unwrap();
    assert_eq!(req.travel_class_or_default(), TravelClass::Economy);
}

#[test]
fn zero_or_missing_passengers_default_to_one_and_are_omitted() {
    for adults in [None, Some(0), Some(1)] {
        let mut input = make_valid_input();
        input.adults = adults;
        let req = SearchRequest::build(&input, today()).unwrap();
        assert_eq!(req.passengers.adults, 1);
        assert_eq!(param(&req.to_url_params(), "adults"), None);
    }
}

#[test]
fn passenger_counts_are_sent_when_set() {
    let mut input = make_valid_input();
    input.adults = Some(2);
    input.children = Some(1);
    input.infants_on_lap = Some(1);
    let req = SearchRequest::build(&input, today()).unwrap();
    let params = req.to_url_params();
    assert_eq!(param(&params, "adults"), Some("2"));
    assert_eq!(param(&params, "children"), Some("1"));
    assert_eq!(param(&params, "infants_on_lap"), Some("1"));
    assert_eq!(param(&params, "infants_in_seat"), None);
}

#[test]
fn rejects_too_many_passengers() {
    let mut input = make_valid_input();
    input.adults = Some(6);
    input.children = Some(4);
    assert!(matches!(
        SearchRequest::build(&input, today()),
        Err(FlightError::Validation(_))
    ));
}

#[test]
fn huge_passenger_counts_are_rejected_not_wrapped() {
    for (adults, children) in [(u32::MAX, 1), (u32::MAX, u32::MAX), (1, u32::MAX)] {
        let mut input = make_valid_input();
        input.adults = Some(adults);
        input.children = Some(children);
        input.infants_in_seat = Some(u32::MAX);
        input.infants_on_lap = Some(u32::MAX);
        assert!(
            matches!(
                SearchRequest::build(&input, today()),
                Err(FlightError::Validation(_))
            ),
            "{adults} + {children}"
        );
    }

    let mut input = make_valid_input();
    input.adults = Some(u32::MAX);
    input.children = Some(1);
    assert!(matches!(
        SearchRequest::build(&input, today()),
        Err(FlightError::Validation(_))
    ));
}

#[test]
fn rejects_infants_exceeding_adults() {
    let mut input = make_valid_input();
    input.infants_on_lap = Some(2);
    assert!(SearchRequest::build(&input, today()).is_err());
}

#[test]
fn rejects_bad_airport_codes() {
    for bad in ["JF", "JFKX", "J1K", ""] {
        let mut input = make_valid_input();
        input.origin = bad.into();
        assert!(
            matches!(
                SearchRequest::build(&input, today()),
                Err(FlightError::InvalidAirport(_))
            ),
            "{bad}"
        );
    }
}

#[test]
fn lowercase_codes_are_uppercased() {
    let mut input = make_valid_input();
    input.origin = "jfk".into();
    let req = SearchRequest::build(&input, today()).unwrap();
    assert_eq!(req.origin, "JFK");
}

#[test]
fn rejects_same_origin_and_destination() {
    let mut input = make_valid_input();
    input.destination = "jfk".into();
    assert!(matches!(
        SearchRequest::build(&input, today()),
        Err(FlightError::Validation(_))
    ));
}

#[test]
fn currency_and_language_params() {
    let mut input = make_valid_input();
    input.currency = Some("eur".into());
    let req = SearchRequest::build(&input, today()).unwrap();
    let params = req.to_url_params();
    assert_eq!(param(&params, "currency"), Some("EUR"));
    assert_eq!(param(&params, "hl"), Some("en"));
}
