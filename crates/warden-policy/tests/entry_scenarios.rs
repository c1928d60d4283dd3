// entry_scenarios.rs — End-to-end checks through the public API.
//
// Loads an evaluator config from disk, builds a small set of grant and deny
// entries the way a policy loader would, publishes them behind an `Arc`, and
// queries them from several threads at once.
//
// VERIFY:
//   - The four reference scenarios (plain grant, name mismatch, wildcard
//     name, voided entry) behave as documented
//   - Config verbosity reaches the entries and their diagnostics
//   - Concurrent readers see identical answers

use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use warden_policy::{
    AllPermission, BasicPrincipal, CodeOrigin, EvaluatorConfig, ExecutionContext, MemorySink,
    NamePattern, OriginPattern, Polarity, PolicyDecision, PolicyEntryBuilder, PolicySet,
    PrincipalPattern, Priority, ResourcePermission,
};

fn file(target: &str, actions: &str) -> ResourcePermission {
    ResourcePermission::new("file", target, actions).unwrap()
}

fn role(name: &str) -> ExecutionContext {
    ExecutionContext::new().with_principal(Arc::new(BasicPrincipal::new("RoleType", name)))
}

#[test]
fn scenario_plain_grant() {
    let mut builder = PolicyEntryBuilder::new(Polarity::Grant, false);
    builder.add_permission(Arc::new(file("file.txt", "read")));
    let entry = builder.build();

    for ctx in [ExecutionContext::new(), role("user"), role("admin")] {
        assert!(entry.implies(&ctx, &file("file.txt", "read")));
        assert!(!entry.implies(&ctx, &file("file.txt", "write")));
    }
}

#[test]
fn scenario_principal_name_mismatch() {
    let mut builder = PolicyEntryBuilder::new(Polarity::Grant, false);
    builder.add_principal(PrincipalPattern::literal("RoleType", "admin"));
    builder.add_permission(Arc::new(AllPermission));
    let entry = builder.build();

    assert!(!entry.implies(&role("user"), &file("file.txt", "read")));
    assert!(entry.implies(&role("admin"), &file("file.txt", "read")));
}

#[test]
fn scenario_principal_name_wildcard() {
    let mut builder = PolicyEntryBuilder::new(Polarity::Grant, false);
    builder.add_principal(PrincipalPattern::new(
        NamePattern::parse("RoleType"),
        NamePattern::parse("*"),
    ));
    builder.add_permission(Arc::new(file("file.txt", "read")));
    let entry = builder.build();

    assert!(entry.implies(&role("user"), &file("file.txt", "read")));
    assert!(!entry.implies(&role("user"), &file("other.txt", "read")));
}

#[test]
fn scenario_voided_entry() {
    let mut builder = PolicyEntryBuilder::new(Polarity::Grant, false);
    builder.add_permission(Arc::new(AllPermission));
    builder.set_never_implies(true);
    let entry = builder.build();

    assert!(!entry.implies(&ExecutionContext::new(), &file("file.txt", "read")));
    assert!(!entry.implies(&role("admin"), &AllPermission));
}

#[test]
fn config_driven_set_shared_across_threads() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("warden.toml");
    std::fs::write(&config_path, "verbose = true\npriority = \"deny\"\n").unwrap();
    let config = EvaluatorConfig::load(&config_path).unwrap();

    let sink = Arc::new(MemorySink::new());
    let mut set = PolicySet::from_config(&config);
    assert_eq!(set.priority(), Priority::Deny);

    // Signed application code running as any RoleType may read /srv data.
    let mut grant = PolicyEntryBuilder::from_config(Polarity::Grant, &config).with_sink(sink.clone());
    grant.set_origin(Arc::new(
        OriginPattern::new("file:/opt/app/**").unwrap().signed_by("release-key"),
    ));
    grant.add_principal(PrincipalPattern::any_name("RoleType"));
    grant.add_permission(Arc::new(file("/srv/**", "read")));
    set.push(grant.build());

    // Nobody reads the secrets directory.
    let mut deny = PolicyEntryBuilder::from_config(Polarity::Deny, &config).with_sink(sink.clone());
    deny.add_permission(Arc::new(file("/srv/secrets/**", "read")));
    set.push(deny.build());

    assert!(set.entries().iter().all(|e| e.is_verbose()));

    let set = Arc::new(set);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let ctx = role("user").with_origin(
                    CodeOrigin::new("file:/opt/app/lib/core.jar").signed_by("release-key"),
                );
                let unsigned = role("user").with_origin(CodeOrigin::new("file:/opt/app/lib/core.jar"));
                (
                    set.decide(&ctx, &file("/srv/reports/q1.csv", "read")),
                    set.decide(&ctx, &file("/srv/secrets/key.pem", "read")),
                    set.decide(&unsigned, &file("/srv/reports/q1.csv", "read")),
                )
            })
        })
        .collect();

    for handle in handles {
        let (report, secret, unsigned) = handle.join().unwrap();
        assert_eq!(report, PolicyDecision::Granted);
        assert_eq!(secret, PolicyDecision::Denied);
        assert_eq!(unsigned, PolicyDecision::NotApplicable);
    }

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l == "Evaluation (codesource) failed."));
    assert!(lines.iter().any(|l| l.starts_with("      denying (file \"/srv/secrets/**\"")));
}
