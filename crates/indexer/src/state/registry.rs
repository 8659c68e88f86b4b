use alloy::primitives::Address;

/// Vaults created by a single factory, in the order of registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultRegistry {
    factory: Address,
    vaults: Vec<Address>,
}

impl VaultRegistry {
    pub(crate) fn new(factory: Address) -> Self { Self { factory, vaults: Vec::new() } }

    pub fn factory(&self) -> Address { self.factory }

    pub fn vaults(&self) -> &[Address] { &self.vaults }

    pub fn count(&self) -> usize { self.vaults.len() }

    pub fn contains(&self, vault: Address) -> bool { self.vaults.contains(&vault) }

    /// Appends the vault, unless already registered.
    pub(crate) fn append(&mut self, vault: Address) -> bool {
        if self.contains(vault) {
            return false;
        }
        self.vaults.push(vault);
        true
    }
}
