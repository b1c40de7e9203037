use anyhow::{Context, Result};
use snmp2::v3::{Auth, AuthProtocol, Cipher, Security};
use snmp2::AsyncSession;

pub struct SnmpClientV3 {
    pub(crate) session: AsyncSession,
}

impl SnmpClientV3 {
    /// Opens an authPriv session and runs engine discovery.
    pub async fn new_auth_priv(
        target: &str,
        username: &[u8],
        auth_password: &[u8],
        auth_protocol: AuthProtocol,
        cipher: Cipher,
        privacy_password: &[u8],
    ) -> Result<Self> {
        let security = Security::new(username, auth_password)
            .with_auth_protocol(auth_protocol)
            .with_auth(Auth::AuthPriv {
                cipher,
                privacy_password: privacy_password.to_vec(),
            });

        let mut session = AsyncSession::new_v3(target, 2, security)
            .await
            .context(format!("cannot open SNMPv3 session to {}", target))?;
        session
            .init()
            .await
            .context(format!("SNMPv3 engine discovery failed for {}", target))?;

        Ok(Self { session })
    }
}
