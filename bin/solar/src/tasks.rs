//! The commands solar can run against a context.

use std::path::Path;

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use solar_core::{DeployRequest, SolarContext};

use crate::cli::Command;

/// Run one command to completion.
pub async fn run(ctx: &SolarContext, command: Command) -> Result<()> {
    match command {
        Command::Status => status(ctx).await,
        Command::Expand { template } => {
            println!("{}", ctx.expand_template(&template).await?);
            Ok(())
        }
        Command::Platform => {
            println!("{}", ctx.platform()?);
            Ok(())
        }
        Command::Options => {
            let options = ctx.compiler_options()?;
            println!("optimize: {}", !options.no_optimize);
            println!("allow-paths: {}", options.allow_paths.join(","));
            Ok(())
        }
        Command::Call { method, params } => {
            let client = ctx.rpc_client()?;
            let result: Value = client.call(&method, rpc_params(params)).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Deploy {
            name,
            bytecode,
            force,
        } => deploy(ctx, name, &bytecode, force).await,
    }
}

async fn status(ctx: &SolarContext) -> Result<()> {
    let repo = ctx.contracts_repository().await?;
    let contracts = repo.contracts();

    if contracts.is_empty() {
        println!("No contracts deployed ({})", repo.path().display());
        return Ok(());
    }

    for contract in contracts {
        let state = if contract.confirmed {
            "confirmed"
        } else {
            "pending"
        };

        println!(
            "{:<24} {} {:<9} tx={}",
            contract.name,
            ctx.format_address(&contract.address),
            state,
            contract.tx_hash
        );
    }

    Ok(())
}

async fn deploy(ctx: &SolarContext, name: String, bytecode: &Path, overwrite: bool) -> Result<()> {
    let bytecode = read_bytecode(bytecode)?;
    let deployer = ctx.deployer().await?;

    tracing::info!(
        name = %name,
        platform = %deployer.platform(),
        size = bytecode.len(),
        "Deploying contract..."
    );

    let contract = deployer
        .create_contract(DeployRequest {
            name,
            bytecode,
            overwrite,
        })
        .await
        .context("Failed to deploy contract")?;

    let address = ctx.format_address(&contract.address);
    ctx.reporter().await.report(json!({
        "type": "contract_deployed",
        "name": contract.name,
        "address": address,
        "tx_hash": contract.tx_hash,
        "confirmed": contract.confirmed,
    }))?;

    println!("{} {}", contract.name, address);
    Ok(())
}

/// Parse each parameter as JSON, keeping the raw text as a string otherwise.
fn rpc_params(params: Vec<String>) -> Vec<Value> {
    params
        .into_iter()
        .map(|param| serde_json::from_str(&param).unwrap_or(Value::String(param)))
        .collect()
}

/// Read hex encoded bytecode, with or without a `0x` prefix.
fn read_bytecode(path: &Path) -> Result<Bytes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bytecode from {}", path.display()))?;
    let content = content.trim();
    let raw = content.strip_prefix("0x").unwrap_or(content);

    anyhow::ensure!(!raw.is_empty(), "Bytecode file is empty: {}", path.display());

    let bytes = hex::decode(raw).context("Bytecode is not valid hex")?;
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_read_bytecode() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join("Token.bin");

        std::fs::write(&path, "0x60806040\n").unwrap();
        assert_eq!(read_bytecode(&path).unwrap(), Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));

        std::fs::write(&path, "6080").unwrap();
        assert_eq!(read_bytecode(&path).unwrap(), Bytes::from_static(&[0x60, 0x80]));
    }

    #[test]
    fn test_read_bytecode_invalid() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join("Token.bin");

        std::fs::write(&path, "  \n").unwrap();
        assert!(read_bytecode(&path).is_err());

        std::fs::write(&path, "0xzz").unwrap();
        assert!(read_bytecode(&path).is_err());

        assert!(read_bytecode(&temp_dir.path().join("missing.bin")).is_err());
    }

    #[test]
    fn test_rpc_params() {
        let params = rpc_params(vec![
            "12".to_string(),
            "true".to_string(),
            "qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW".to_string(),
            r#"{"a":1}"#.to_string(),
        ]);
        assert_eq!(
            params,
            vec![
                json!(12),
                json!(true),
                json!("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW"),
                json!({ "a": 1 }),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_expand_and_status() {
        let temp_dir = TempDir::new("solar-test").expect("Failed to create temp dir");
        let ctx = SolarContext::new(solar_core::Config {
            repo: Some(temp_dir.path().join("solar.test.json")),
            ..Default::default()
        });

        run(&ctx, Command::Status).await.unwrap();
        run(&ctx, Command::Expand {
            template: "no vars here".to_string(),
        })
        .await
        .unwrap();
        assert!(run(&ctx, Command::Expand {
            template: "$Missing".to_string(),
        })
        .await
        .is_err());
        assert!(run(&ctx, Command::Platform).await.is_err());
        assert!(run(&ctx, Command::Call {
            method: "getblockcount".to_string(),
            params: vec![],
        })
        .await
        .is_err());
    }
}
