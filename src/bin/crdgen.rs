//! CRD manifest generator.
//!
//! Prints the CustomResourceDefinitions served by the controller as YAML, ready for
//! `kubectl apply -f -`.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use cloud_resource_controller::{CloudsqlInstance, GkeCluster, Provider};
use kube::CustomResourceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    All,
    GkeCluster,
    CloudsqlInstance,
    Provider,
}

#[derive(Debug, Parser)]
#[command(name = "crdgen", about = "Print CRD manifests for the Cloud Resource Controller")]
struct Cli {
    /// Which CRD to print
    #[arg(long, value_enum, default_value_t = Kind::All)]
    kind: Kind,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let crds = match cli.kind {
        Kind::All => vec![GkeCluster::crd(), CloudsqlInstance::crd(), Provider::crd()],
        Kind::GkeCluster => vec![GkeCluster::crd()],
        Kind::CloudsqlInstance => vec![CloudsqlInstance::crd()],
        Kind::Provider => vec![Provider::crd()],
    };

    let documents = crds
        .iter()
        .map(serde_yaml::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    print!("{}", documents.join("---\n"));
    Ok(())
}
