pub mod calldata;
pub mod constants;
pub mod domain;
pub mod eip712;
pub mod encoding;
pub mod policy;
pub mod ports;
pub mod recovery;
pub mod whitelist;

pub use calldata::{policy_update, MultiSendTx, SafeCall};
pub use constants::{ContractTable, GuardContract, SENTINEL_ADDRESS};
pub use domain::{
    Chain, EvmDestination, Operation, SafeTxRequest, WhitelistInstruction, WhitelistSettings,
};
pub use eip712::{compute_safe_transaction_hash, Eip712Hasher};
pub use encoding::{left_pad, normalize_address};
pub use policy::{Policy, SafeTx};
pub use ports::{CustodyError, HashingPort, SignerPort};
pub use recovery::{
    sign_signables, ChainPubkey, OrgAdminRecoveryRequest, RecoveryBuilder, RecoverySafeTx,
    RecoverySigningData, RecoveryTxs, SignableRecoveryData, SignedRecoveryData,
};
pub use whitelist::{
    all_changes, current_settings_for_guard_name, guard_name_for_target_settings,
    target_guard_address, WhitelistDiff,
};
