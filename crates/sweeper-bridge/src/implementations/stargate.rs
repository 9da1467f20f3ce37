//! Stargate V2 native pool backend.
//!
//! The fee is read on-chain with `quoteSend` against the source chain's
//! native pool. The submitted `send` call carries `amountLD + nativeFee` as
//! value. Pools only move whole units of shared decimals, so `amountLD` is
//! rounded down to a multiple of 10^12 wei.

use crate::{BridgeError, BridgeInterface, BridgeRequest};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::collections::HashMap;
use sweeper_delivery::DeliveryService;
use sweeper_types::{BridgeQuote, ChainRegistry, StargateDeployment, Transaction};

/// Granularity of amounts a native pool accepts (18 local minus 6 shared decimals).
const SHARED_DECIMALS_UNIT: u64 = 1_000_000_000_000;

sol! {
	struct SendParam {
		uint32 dstEid;
		bytes32 to;
		uint256 amountLD;
		uint256 minAmountLD;
		bytes extraOptions;
		bytes composeMsg;
		bytes oftCmd;
	}

	struct MessagingFee {
		uint256 nativeFee;
		uint256 lzTokenFee;
	}

	struct MessagingReceipt {
		bytes32 guid;
		uint64 nonce;
		MessagingFee fee;
	}

	struct OFTReceipt {
		uint256 amountSentLD;
		uint256 amountReceivedLD;
	}

	function quoteSend(SendParam calldata sendParam, bool payInLzToken)
		external
		view
		returns (MessagingFee memory fee);

	function send(SendParam calldata sendParam, MessagingFee calldata fee, address refundAddress)
		external
		payable
		returns (MessagingReceipt memory msgReceipt, OFTReceipt memory oftReceipt);
}

pub struct StargateBridge {
	delivery: DeliveryService,
	deployments: HashMap<u64, StargateDeployment>,
	slippage_bps: u32,
}

impl StargateBridge {
	/// Creates a backend for every chain in `registry` with a native pool.
	pub fn new(delivery: DeliveryService, registry: &ChainRegistry, slippage_bps: u32) -> Self {
		let deployments = registry
			.iter()
			.filter_map(|chain| chain.stargate.map(|d| (chain.chain_id, d)))
			.collect();
		Self {
			delivery,
			deployments,
			slippage_bps,
		}
	}

	fn deployment(&self, chain_id: u64) -> Result<&StargateDeployment, BridgeError> {
		self.deployments
			.get(&chain_id)
			.ok_or(BridgeError::UnsupportedChain(chain_id))
	}

	fn send_param(&self, dst_eid: u32, recipient: Address, amount: U256) -> SendParam {
		let unit = U256::from(SHARED_DECIMALS_UNIT);
		let amount_ld = amount / unit * unit;
		let min_amount_ld =
			amount_ld * U256::from(10_000 - self.slippage_bps.min(10_000)) / U256::from(10_000u64);
		SendParam {
			dstEid: dst_eid,
			to: recipient.into_word(),
			amountLD: amount_ld,
			minAmountLD: min_amount_ld,
			extraOptions: Bytes::new(),
			composeMsg: Bytes::new(),
			oftCmd: Bytes::new(),
		}
	}

	fn send_transaction(
		pool: Address,
		chain_id: u64,
		param: SendParam,
		native_fee: U256,
		refund: Address,
	) -> Transaction {
		let value = param.amountLD + native_fee;
		let call = sendCall {
			sendParam: param,
			fee: MessagingFee {
				nativeFee: native_fee,
				lzTokenFee: U256::ZERO,
			},
			refundAddress: refund,
		};
		Transaction {
			to: Some(pool),
			data: call.abi_encode(),
			value,
			chain_id,
			nonce: None,
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		}
	}
}

#[async_trait]
impl BridgeInterface for StargateBridge {
	fn name(&self) -> &'static str {
		"stargate"
	}

	fn currency(&self) -> &'static str {
		"ETH"
	}

	fn fee_guesses(&self) -> Vec<U256> {
		Vec::new()
	}

	async fn quote(&self, request: &BridgeRequest) -> Result<BridgeQuote, BridgeError> {
		let source = *self.deployment(request.from_chain_id)?;
		let destination = self.deployment(request.to_chain_id)?;

		let param = self.send_param(destination.endpoint_id, request.recipient, request.amount);
		if param.amountLD.is_zero() {
			return Err(BridgeError::InvalidResponse(format!(
				"Amount {} is below the pool granularity",
				request.amount
			)));
		}

		let call = quoteSendCall {
			sendParam: param.clone(),
			payInLzToken: false,
		};
		let probe = Transaction {
			to: Some(source.pool),
			data: call.abi_encode(),
			value: U256::ZERO,
			chain_id: request.from_chain_id,
			nonce: None,
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		};
		let raw = self.delivery.eth_call(probe).await?;
		let fee = quoteSendCall::abi_decode_returns(&raw)
			.map_err(|e| BridgeError::InvalidResponse(format!("Failed to decode quoteSend: {}", e)))?;

		tracing::debug!(
			from = request.from_chain_id,
			to = request.to_chain_id,
			amount = %param.amountLD,
			fee = %fee.nativeFee,
			"Stargate quote received"
		);

		let transaction = Self::send_transaction(
			source.pool,
			request.from_chain_id,
			param,
			fee.nativeFee,
			request.user,
		);

		Ok(BridgeQuote {
			fee: fee.nativeFee,
			amount: request.amount,
			transaction,
			estimated_gas: None,
		})
	}

	// The pool reverts when value does not cover the fee plus the amount,
	// so the probe sends one granularity unit on top of the fee.
	fn gas_probe(&self, quote: &BridgeQuote) -> Result<Transaction, BridgeError> {
		self.adjust(quote, quote.fee + U256::from(SHARED_DECIMALS_UNIT))
	}

	fn adjust(&self, quote: &BridgeQuote, value: U256) -> Result<Transaction, BridgeError> {
		let call = sendCall::abi_decode(&quote.transaction.data)
			.map_err(|e| BridgeError::InvalidResponse(format!("Failed to decode send: {}", e)))?;

		let native_fee = call.fee.nativeFee;
		if value <= native_fee {
			return Err(BridgeError::InvalidResponse(format!(
				"Value {} does not cover the messaging fee {}",
				value, native_fee
			)));
		}

		let recipient = Address::from_word(call.sendParam.to);
		let param = self.send_param(call.sendParam.dstEid, recipient, value - native_fee);
		if param.amountLD.is_zero() {
			return Err(BridgeError::InvalidResponse(format!(
				"Value {} is below the pool granularity",
				value
			)));
		}

		let pool = quote.transaction.to.ok_or_else(|| {
			BridgeError::InvalidResponse("Quoted transaction has no recipient".into())
		})?;

		Ok(Transaction {
			gas_limit: quote.transaction.gas_limit,
			..Self::send_transaction(
				pool,
				quote.transaction.chain_id,
				param,
				native_fee,
				call.refundAddress,
			)
		})
	}
}
