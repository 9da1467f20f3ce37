//! Account management for the sweeper.
//!
//! Accounts are imported once from a key file before the run starts and stay
//! immutable afterwards. Each account owns a signer and, optionally, the
//! destination address native funds are forwarded to.

use alloy_primitives::Address;
use thiserror::Error;

/// Key-file and proxy-file parsing.
pub mod import;
/// Signer abstraction module
pub mod signer;

pub use import::{load_accounts, load_proxies, parse_accounts, parse_proxies};
pub use signer::AccountSigner;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key on line {line}: {reason}")]
	InvalidKey { line: usize, reason: String },
	/// Error that occurs when a destination address cannot be parsed.
	#[error("Invalid destination address on line {line}: {value}")]
	InvalidAddress { line: usize, value: String },
	/// The account has no destination but the scenario forwards funds.
	#[error("Account {0} has no destination address")]
	MissingDestination(Address),
	/// Error that occurs while reading an input file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// One imported account.
#[derive(Debug, Clone)]
pub struct Account {
	signer: AccountSigner,
	destination: Option<Address>,
}

impl Account {
	pub fn new(signer: AccountSigner, destination: Option<Address>) -> Self {
		Self {
			signer,
			destination,
		}
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub fn signer(&self) -> &AccountSigner {
		&self.signer
	}

	pub fn destination(&self) -> Option<Address> {
		self.destination
	}

	/// Destination address, or an error when the key file did not provide one.
	pub fn require_destination(&self) -> Result<Address, AccountError> {
		self.destination
			.ok_or_else(|| AccountError::MissingDestination(self.address()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_signer_local::PrivateKeySigner;

	#[test]
	fn test_require_destination() {
		let signer = AccountSigner::Local(PrivateKeySigner::random());
		let without = Account::new(signer.clone(), None);
		assert!(matches!(
			without.require_destination(),
			Err(AccountError::MissingDestination(addr)) if addr == signer.address()
		));

		let dest = address!("2222222222222222222222222222222222222222");
		let with = Account::new(signer, Some(dest));
		assert_eq!(with.require_destination().unwrap(), dest);
	}
}
