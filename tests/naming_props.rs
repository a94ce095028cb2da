use helmsman::naming::{
    controller_method_name, endpoint_method_name, hyphenate, parse_controller_method,
    parse_endpoint_method, unhyphenate,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn hyphenate_inverts_unhyphenate(segment in "[a-z]{2,8}(-[a-z]{2,8}){0,3}") {
        prop_assert_eq!(hyphenate(&unhyphenate(&segment)), segment);
    }

    #[test]
    fn endpoint_names_parse_back(
        verb in prop::sample::select(vec!["GET", "POST", "PUT", "PATCH", "DELETE"]),
        segment in "[a-z]{2,8}(-[a-z]{2,8}){0,3}",
    ) {
        let name = endpoint_method_name(verb, &segment);
        prop_assert_eq!(
            parse_endpoint_method(&name),
            Some((verb.to_lowercase(), segment))
        );
    }

    #[test]
    fn controller_names_parse_back(segment in "[a-z]{2,8}(-[a-z]{2,8}){0,3}") {
        let name = controller_method_name(&segment);
        prop_assert_eq!(parse_controller_method(&name), Some(segment));
    }

    #[test]
    fn separators_are_interchangeable(words in prop::collection::vec("[a-z]{1,6}", 1..4)) {
        let hyphens = words.join("-");
        let pluses = words.join("+");
        let spaces = words.join("%20");
        prop_assert_eq!(unhyphenate(&hyphens), unhyphenate(&pluses));
        prop_assert_eq!(unhyphenate(&hyphens), unhyphenate(&spaces));
    }
}
