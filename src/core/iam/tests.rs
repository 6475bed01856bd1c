//! Integration tests for the permission model

use super::*;
use crate::role::RoleSet;
use serde_json::json;

/// Rule matrix resembling a school's default setup
fn school_rules() -> Vec<PermissionRule> {
    vec![
        // Everyone sees the dashboard
        PermissionRule::allow("*", "dashboard", "view"),
        // Teachers keep journals and take attendance
        PermissionRule::allow("GURU", "jurnal", "*"),
        PermissionRule::allow("GURU", "absensi", "view"),
        PermissionRule::allow("GURU", "absensi", "create"),
        PermissionRule::allow("GURU", "master", "view"),
        // Homeroom teachers manage their class settings and grades
        PermissionRule::allow("WALI_KELAS", "pengaturan_data.wali_kelas", "manage"),
        PermissionRule::allow("WALI_KELAS", "nilai", "update"),
        // Students only see their schedule
        PermissionRule::allow("SISWA", "jadwal", "view"),
        PermissionRule::deny("SISWA", "nilai", "view"),
    ]
}

#[test]
fn test_school_scenario() {
    let evaluator = PermissionEvaluator::default();
    let rules = school_rules();
    let guru = RoleSet::parse("guru");
    let wali = RoleSet::parse("GURU|WALI_KELAS");
    let siswa = RoleSet::parse("siswa");

    // Teachers
    assert!(evaluator.check(&guru, &rules, "dashboard", "view"));
    assert!(evaluator.check(&guru, &rules, "jurnal", "delete"));
    assert!(evaluator.check(&guru, &rules, "absensi", "create"));
    assert!(!evaluator.check(&guru, &rules, "absensi", "delete"));
    assert!(evaluator.check(&guru, &rules, "master.siswa", "view"));
    assert!(!evaluator.check(&guru, &rules, "master.siswa", "update"));
    assert!(!evaluator.check(&guru, &rules, "nilai", "update"));

    // Homeroom teachers also hold GURU
    assert!(evaluator.check(&wali, &rules, "jurnal", "view"));
    assert!(evaluator.check(&wali, &rules, "nilai", "update"));
    for action in ["create", "update", "delete"] {
        assert!(evaluator.check(&wali, &rules, "pengaturan_data.wali_kelas", action));
    }
    assert!(!evaluator.check(&wali, &rules, "pengaturan_data", "update"));

    // Students
    assert!(evaluator.check(&siswa, &rules, "dashboard", "view"));
    assert!(evaluator.check(&siswa, &rules, "jadwal", "view"));
    assert!(!evaluator.check(&siswa, &rules, "nilai", "view"));
    assert!(!evaluator.check(&siswa, &rules, "jurnal", "view"));
}

#[test]
fn test_plain_function_matches_evaluator() {
    // With rules pre-filtered to the principal, the two entry points agree
    let evaluator = PermissionEvaluator::default();
    let roles = RoleSet::parse("GURU");
    let rules: Vec<PermissionRule> = school_rules()
        .into_iter()
        .filter(|r| roles.iter().any(|role| r.applies_to_role(role.as_str())))
        .collect();

    let checks = [
        ("jurnal", "delete"),
        ("absensi", "view"),
        ("absensi", "update"),
        ("master.guru", "view"),
        ("masterdata", "view"),
        ("nilai", "view"),
        ("", "view"),
    ];
    for (resource, action) in checks {
        assert_eq!(
            has_permission(&rules, resource, action, false),
            evaluator.check(&roles, &rules, resource, action),
            "mismatch on {} {}",
            resource,
            action
        );
    }
}

#[test]
fn test_rules_from_json_with_evaluation() {
    let rules_json = json!([
        {"role": "GURU", "resource": "jurnal", "action": "view", "is_allowed": true},
        {"role": "GURU", "resource": "nilai", "action": "*", "is_allowed": false},
        {"role": "*", "resource": "*", "action": "view"}
    ]);

    let rules: Vec<PermissionRule> = serde_json::from_value(rules_json).unwrap();
    assert_eq!(rules.len(), 3);

    assert!(has_permission(&rules, "jurnal", "view", false));
    assert!(has_permission(&rules, "nilai", "view", false));
    assert!(!has_permission(&rules, "nilai", "update", false));
}

#[test]
fn test_denied_rules_never_grant_in_any_mode() {
    let rules = vec![
        PermissionRule::deny("GURU", "*", "*"),
        PermissionRule::deny("GURU", "nilai", "manage"),
    ];
    let roles = RoleSet::parse("GURU");

    for mode in [
        EvaluationMode::AnyAllow,
        EvaluationMode::DenyOverrides,
        EvaluationMode::MostSpecific,
    ] {
        let evaluator = PermissionEvaluator::new(mode);
        assert!(!evaluator.check(&roles, &rules, "nilai", "view"));
        assert!(!evaluator.check(&roles, &rules, "jurnal", "view"));
    }
}

#[test]
fn test_modes_on_conflict() {
    // allow jurnal.* for GURU, deny jurnal delete for GURU
    let rules = vec![
        PermissionRule::allow("GURU", "jurnal", "*"),
        PermissionRule::deny("GURU", "jurnal", "delete"),
    ];
    let roles = RoleSet::parse("GURU");

    let any = PermissionEvaluator::new(EvaluationMode::AnyAllow);
    let deny = PermissionEvaluator::new(EvaluationMode::DenyOverrides);
    let specific = PermissionEvaluator::new(EvaluationMode::MostSpecific);

    assert!(any.check(&roles, &rules, "jurnal", "delete"));
    assert!(!deny.check(&roles, &rules, "jurnal", "delete"));
    assert!(!specific.check(&roles, &rules, "jurnal", "delete"));

    // unaffected actions stay granted everywhere
    for evaluator in [any, deny, specific] {
        assert!(evaluator.check(&roles, &rules, "jurnal", "update"));
    }
}

#[test]
fn test_broad_deny_narrow_allow() {
    let rules = vec![
        PermissionRule::deny("GURU", "master", "*"),
        PermissionRule::allow("GURU", "master.siswa", "view"),
    ];
    let roles = RoleSet::parse("GURU");

    assert!(PermissionEvaluator::new(EvaluationMode::AnyAllow).check(
        &roles,
        &rules,
        "master.siswa",
        "view"
    ));
    assert!(!PermissionEvaluator::new(EvaluationMode::DenyOverrides).check(
        &roles,
        &rules,
        "master.siswa",
        "view"
    ));
    assert!(PermissionEvaluator::new(EvaluationMode::MostSpecific).check(
        &roles,
        &rules,
        "master.siswa",
        "view"
    ));
}

#[test]
fn test_tab_scoped_actions() {
    let rules = vec![
        PermissionRule::allow("GURU", "master", "tab:siswa"),
        PermissionRule::allow("WALI_KELAS", "master", "manage"),
    ];
    let evaluator = PermissionEvaluator::default();

    assert!(evaluator.check(&RoleSet::parse("GURU"), &rules, "master", "tab:siswa"));
    assert!(!evaluator.check(&RoleSet::parse("GURU"), &rules, "master", "tab:guru"));
    assert!(evaluator.check(&RoleSet::parse("WALI_KELAS"), &rules, "master", "tab:guru"));
}

#[test]
fn test_colon_delimited_resources() {
    let rules = vec![PermissionRule::allow("GURU", "jurnal", "view")];

    assert!(has_permission(&rules, "jurnal:guru", "view", false));
    assert!(!has_permission(&rules, "jurnalguru", "view", false));
}

#[test]
fn test_decision_display() {
    let evaluator = PermissionEvaluator::default();
    let rules = school_rules();

    let decision = evaluator.decide(&RoleSet::parse("GURU"), &rules, "jurnal", "view");
    assert_eq!(decision.to_string(), "allowed by rule GURU/jurnal/*");
    assert_eq!(decision.rule().map(|r| r.action.as_str()), Some("*"));

    let decision = evaluator.decide(&RoleSet::parse("GURU"), &rules, "keuangan", "view");
    assert_eq!(decision.to_string(), "denied: no matching rule");
    assert!(decision.rule().is_none());
}
