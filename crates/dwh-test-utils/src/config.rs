//! `dwh.cfg` fixtures

use std::path::{Path, PathBuf};

/// A complete config in its pre-provisioning state
pub const TEMPLATE: &str = "\
# Warehouse configuration used by tests
[AWS]
KEY=AKIDEXAMPLE
SECRET=wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY
REGION=us-west-2

[DWH]
DWH_CLUSTER_TYPE=multi-node
DWH_NUM_NODES=4
DWH_NODE_TYPE=dc2.large
DWH_CLUSTER_IDENTIFIER=dwhCluster
DWH_DB=dwh
DWH_DB_USER=dwhuser
DWH_DB_PASSWORD=Passw0rd
DWH_PORT=5439
DWH_IAM_ROLE_NAME=dwhRole

[CLUSTER]
HOST=${redshift_host}
DB_NAME=dwh
DB_USER=dwhuser
DB_PASSWORD=Passw0rd
DB_PORT=5439

[IAM_ROLE]
IAM_ROLE_ARN=${iam_role_arn}

[S3]
LOG_DATA=s3://udacity-dend/log_data
LOG_JSONPATH=s3://udacity-dend/log_json_path.json
SONG_DATA=s3://udacity-dend/song_data

[PROVISION]
POLL_INTERVAL_SECS=30
";

/// Write [`TEMPLATE`] to `dir/dwh.cfg` and return the path
pub fn write_template(dir: &Path) -> PathBuf {
    write_config(dir, TEMPLATE)
}

/// Write arbitrary config text to `dir/dwh.cfg` and return the path
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("dwh.cfg");
    std::fs::write(&path, contents).expect("failed to write test config");
    path
}
