#![no_main]
use libfuzzer_sys::fuzz_target;
use school_rbac::RoleSet;

fuzz_target!(|raw: &str| {
    let roles = RoleSet::parse(raw);

    for role in roles.iter() {
        let name = role.as_str();
        assert!(!name.is_empty());
        assert_eq!(name, name.trim());
        assert_eq!(name, name.to_uppercase());
        assert!(!name.contains(',') && !name.contains('|'));
    }

    // Deduplicated
    let mut names = roles.names();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);

    // Re-parsing the normalized form is stable
    let again = RoleSet::parse(&roles.names().join("|"));
    assert_eq!(again.names(), roles.names());
    assert_eq!(again.is_admin(), roles.is_admin());
});
