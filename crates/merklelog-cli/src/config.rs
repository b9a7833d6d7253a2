//! Storage and log settings shared by every command.

use clap::Args;
use merklelog_canonical::TenantId;
use merklelog_massifs::{MassifReader, ReaderConfig, DEFAULT_CONTAINER, DEFAULT_MASSIF_HEIGHT};
use merklelog_verify::{VerificationKey, VerifyOptions};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct StorageArgs {
    /// Base URL of the blob store holding the log
    #[arg(long, global = true, env = "MERKLELOG_URL")]
    pub url: Option<String>,

    /// Local mirror of the blob store (takes precedence over --url)
    #[arg(long, global = true, env = "MERKLELOG_DIR")]
    pub dir: Option<PathBuf>,

    /// Blob container under the base URL
    #[arg(long, global = true, env = "MERKLELOG_CONTAINER", default_value = DEFAULT_CONTAINER)]
    pub container: String,

    /// Tenant whose log is read (default: each event's tenant_identity)
    #[arg(long, global = true, env = "MERKLELOG_TENANT")]
    pub tenant: Option<String>,

    /// Massif height of the log
    #[arg(long, global = true, default_value_t = DEFAULT_MASSIF_HEIGHT)]
    pub massif_height: u8,
}

impl StorageArgs {
    pub fn reader(&self) -> Result<Box<dyn MassifReader>, Box<dyn std::error::Error>> {
        let config = match (&self.dir, &self.url) {
            (Some(dir), _) => ReaderConfig::Directory(dir.clone()),
            (None, Some(url)) => ReaderConfig::Http {
                base_url: url.clone(),
                container: self.container.clone(),
            },
            (None, None) => return Err("no log storage: set --dir or --url".into()),
        };
        Ok(config.open()?)
    }

    pub fn tenant(&self) -> Result<Option<TenantId>, Box<dyn std::error::Error>> {
        self.tenant
            .as_deref()
            .map(|t| {
                TenantId::parse(t).map_err(|e| -> Box<dyn std::error::Error> {
                    format!("Invalid tenant: {}", e).into()
                })
            })
            .transpose()
    }

    /// Tenant for commands that have no event to take it from.
    pub fn required_tenant(&self) -> Result<TenantId, Box<dyn std::error::Error>> {
        self.tenant()?
            .ok_or_else(|| "no tenant: set --tenant or MERKLELOG_TENANT".into())
    }

    pub fn options(&self) -> Result<VerifyOptions, Box<dyn std::error::Error>> {
        Ok(VerifyOptions {
            tenant_id: self.tenant()?,
            massif_height: self.massif_height,
            ..VerifyOptions::default()
        })
    }
}

pub fn load_key(path: &Path) -> Result<VerificationKey, Box<dyn std::error::Error>> {
    Ok(VerificationKey::from_pem_file(path)?)
}
