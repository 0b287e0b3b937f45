use clap::Parser;
use clinic_shared::ClinicType;
use std::path::PathBuf;

use crate::{Cli, Command};

#[test]
fn test_add_tenant_defaults() {
    let cli = Cli::try_parse_from(["clinic-ops", "add-tenant", "--name", "Clinica Sol"]).unwrap();
    match cli.command {
        Command::AddTenant {
            name,
            timezone,
            clinic_type,
            slug,
            ..
        } => {
            assert_eq!(name, "Clinica Sol");
            assert_eq!(timezone, "America/Sao_Paulo");
            assert_eq!(clinic_type, ClinicType::Mixed);
            assert_eq!(slug, None);
        }
        other => panic!("unexpected command {:?}", other),
    }
    assert!(!cli.verbose);
}

#[test]
fn test_clinic_type_is_checked() {
    let parsed = Cli::try_parse_from([
        "clinic-ops",
        "add-tenant",
        "--name",
        "X",
        "--clinic-type",
        "dental",
    ])
    .unwrap();
    assert!(matches!(
        parsed.command,
        Command::AddTenant { clinic_type: ClinicType::Dental, .. }
    ));

    assert!(
        Cli::try_parse_from(["clinic-ops", "add-tenant", "--name", "X", "--clinic-type", "vet"])
            .is_err()
    );
}

#[test]
fn test_add_professional_requires_clinic() {
    assert!(Cli::try_parse_from(["clinic-ops", "add-professional", "--name", "Ana"]).is_err());

    let cli = Cli::try_parse_from([
        "clinic-ops",
        "-v",
        "add-professional",
        "--clinic",
        "sol",
        "--name",
        "Ana",
        "--slot-minutes",
        "45",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert!(matches!(
        cli.command,
        Command::AddProfessional { slot_minutes: 45, .. }
    ));
}

#[test]
fn test_workflow_command_defaults() {
    let cli = Cli::try_parse_from(["clinic-ops", "import-workflows"]).unwrap();
    match cli.command {
        Command::ImportWorkflows { dir, url, api_key } => {
            assert_eq!(dir, PathBuf::from("workflows"));
            assert_eq!(url, None);
            assert_eq!(api_key, None);
        }
        other => panic!("unexpected command {:?}", other),
    }

    let cli = Cli::try_parse_from(["clinic-ops", "merge-handlers"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::MergeHandlers { ref workflows_dir, .. } if workflows_dir == &PathBuf::from("workflows/main")
    ));

    let cli = Cli::try_parse_from(["clinic-ops", "validate-workflows", "--workflows-dir", "wf"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Command::ValidateWorkflows { ref workflows_dir } if workflows_dir == &PathBuf::from("wf")
    ));
}
