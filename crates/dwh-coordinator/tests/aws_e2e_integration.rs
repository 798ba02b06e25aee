//! Full end-to-end integration test
//!
//! Creates a real single-node cluster, checks the config write-back, then
//! tears everything down. Takes several minutes and costs money.
//!
//! Run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_e2e_integration -- --ignored
//! ```

use dwh_coordinator::config::{ConfigDocument, ConfigError, ConnectionSettings};
use dwh_coordinator::orchestrator::{self, CleanupResult, LogReporter};
use dwh_test_utils::aws::{get_test_region, test_cluster_identifier, test_role_name};
use dwh_test_utils::config::{TEMPLATE, write_config};

/// The shared template, pointed at throwaway resource names and the
/// default credential chain
fn live_config(region: &str, cluster: &str, role: &str) -> String {
    TEMPLATE
        .lines()
        .filter(|line| !line.starts_with("KEY=") && !line.starts_with("SECRET="))
        .map(|line| match line.split_once('=') {
            Some(("REGION", _)) => format!("REGION={region}"),
            Some(("DWH_CLUSTER_TYPE", _)) => "DWH_CLUSTER_TYPE=single-node".to_string(),
            Some(("DWH_CLUSTER_IDENTIFIER", _)) => format!("DWH_CLUSTER_IDENTIFIER={cluster}"),
            Some(("DWH_IAM_ROLE_NAME", _)) => format!("DWH_IAM_ROLE_NAME={role}"),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[tokio::test]
#[ignore]
async fn test_provision_and_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let cluster = test_cluster_identifier();
    let role = test_role_name();
    let path = write_config(dir.path(), &live_config(&get_test_region(), &cluster, &role));
    let reporter = LogReporter::new();

    let provisioned = orchestrator::run_provision(&path, &reporter, None).await;

    // Tear down even if provisioning failed half way
    let report = orchestrator::run_teardown(&path, &reporter)
        .await
        .expect("teardown should read the config");

    let outcome = provisioned.expect("provisioning should succeed");
    assert!(outcome.endpoint.contains(".redshift.amazonaws.com"));
    assert!(outcome.role_arn.ends_with(&format!(":role/{role}")));

    assert!(report.is_clean(), "teardown failures: {report:?}");
    assert!(
        report
            .steps
            .iter()
            .all(|(_, result)| *result == CleanupResult::Deleted)
    );

    let doc = ConfigDocument::load(&path).unwrap();
    assert!(matches!(
        ConnectionSettings::from_document(&doc),
        Err(ConfigError::NotProvisioned { .. })
    ));
}
