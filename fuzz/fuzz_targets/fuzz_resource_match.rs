#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use school_rbac::core::iam::{ResourceMatcher, ResourcePath};
use school_rbac::{has_permission, PermissionRule};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    rule_resource: &'a str,
    rule_action: &'a str,
    allowed: bool,
    resource: &'a str,
    action: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let rule = PermissionRule::new("GURU", input.rule_resource, input.rule_action, input.allowed);
    let granted = has_permission(&[rule], input.resource, input.action, false);

    // Never grants on a deny rule or malformed request
    if !input.allowed || input.resource.is_empty() || input.action.is_empty() {
        assert!(!granted);
    }

    // Admin override always grants
    assert!(has_permission(&[], input.resource, input.action, true));

    // String and segment matchers agree on well-formed identifiers
    let well_formed = |s: &str| {
        s == "*"
            || (!s.is_empty()
                && s.split(&['.', ':'][..])
                    .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')))
    };
    if well_formed(input.rule_resource) && well_formed(input.resource) {
        assert_eq!(
            ResourceMatcher::matches(input.rule_resource, input.resource),
            ResourcePath::parse(input.rule_resource).covers(&ResourcePath::parse(input.resource))
        );
    }
});
