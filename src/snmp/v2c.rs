use anyhow::{Context, Result};
use snmp2::AsyncSession;

pub struct SnmpClientV2c {
    pub(crate) session: AsyncSession,
}

impl SnmpClientV2c {
    pub async fn new(target: &str, community: &[u8]) -> Result<Self> {
        let session = AsyncSession::new_v2c(target, community, 2)
            .await
            .context(format!("cannot open SNMPv2c session to {}", target))?;

        Ok(Self { session })
    }
}
