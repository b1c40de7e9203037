use super::v2c::SnmpClientV2c;
use super::v3::SnmpClientV3;

/// Open SNMP session to one agent.
pub enum SnmpClient {
    V2c(SnmpClientV2c),
    V3(SnmpClientV3),
}
