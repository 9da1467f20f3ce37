//! Client for the Relay quote API.
//!
//! `POST /quote` returns the fees of a route together with the transactions
//! the user must send. The same endpoint serves cross-chain bridging
//! (`EXACT_OUTPUT` of native to native) and same-chain swaps (`EXACT_INPUT`
//! of a token to native).
//!
//! When proxies are configured one HTTP client is built per proxy and
//! requests rotate through them round-robin.

use crate::BridgeError;
use alloy_primitives::{Address, Bytes, U256};
use reqwest::{
	header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT},
	Client, Proxy,
};
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use sweeper_types::Transaction;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const REFERRER: &str = "relay.link/bridge";

/// Zero address used by Relay for a chain's native currency.
pub const NATIVE_CURRENCY: Address = Address::ZERO;

/// Trade direction of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
	/// `amount` is what the recipient receives.
	ExactOutput,
	/// `amount` is what the user spends.
	ExactInput,
}

/// Chain ids go over the wire as decimal strings.
fn chain_id_string<S: Serializer>(chain_id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.collect_str(chain_id)
}

/// Body of `POST /quote`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayQuoteRequest {
	pub user: Address,
	#[serde(serialize_with = "chain_id_string")]
	pub origin_chain_id: u64,
	#[serde(serialize_with = "chain_id_string")]
	pub destination_chain_id: u64,
	pub origin_currency: Address,
	pub destination_currency: Address,
	pub recipient: Address,
	pub trade_type: TradeType,
	pub amount: String,
	pub use_permit: bool,
	pub use_external_liquidity: bool,
	pub referrer: String,
}

impl RelayQuoteRequest {
	/// Native-to-native bridge quote that delivers `amount` to `recipient`.
	pub fn bridge(
		user: Address,
		recipient: Address,
		origin_chain_id: u64,
		destination_chain_id: u64,
		amount: U256,
	) -> Self {
		Self {
			user,
			origin_chain_id,
			destination_chain_id,
			origin_currency: NATIVE_CURRENCY,
			destination_currency: NATIVE_CURRENCY,
			recipient,
			trade_type: TradeType::ExactOutput,
			amount: amount.to_string(),
			use_permit: false,
			use_external_liquidity: false,
			referrer: REFERRER.to_string(),
		}
	}

	/// Same-chain quote that sells exactly `amount` of `token` for native currency.
	pub fn swap_to_native(user: Address, chain_id: u64, token: Address, amount: U256) -> Self {
		Self {
			user,
			origin_chain_id: chain_id,
			destination_chain_id: chain_id,
			origin_currency: token,
			destination_currency: NATIVE_CURRENCY,
			recipient: user,
			trade_type: TradeType::ExactInput,
			amount: amount.to_string(),
			use_permit: false,
			use_external_liquidity: false,
			referrer: REFERRER.to_string(),
		}
	}
}

/// Numeric field as Relay serialises it.
///
/// Amounts usually arrive as decimal strings, but transaction fields may be
/// plain numbers, hex strings, or an ethers-style `{ "type": "BigNumber",
/// "hex": "0x..." }` object that has to be unwrapped to its hex form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayNumber {
	Text(String),
	Number(u64),
	BigNumber {
		#[serde(rename = "type")]
		kind: String,
		hex: String,
	},
}

impl RelayNumber {
	pub fn to_u256(&self) -> Result<U256, BridgeError> {
		let raw = match self {
			RelayNumber::Number(n) => return Ok(U256::from(*n)),
			RelayNumber::Text(s) => s.as_str(),
			RelayNumber::BigNumber { hex, .. } => hex.as_str(),
		};
		U256::from_str(raw.trim())
			.map_err(|e| BridgeError::InvalidResponse(format!("Invalid number '{}': {}", raw, e)))
	}

	pub fn to_u128(&self) -> Result<u128, BridgeError> {
		let value = self.to_u256()?;
		u128::try_from(value)
			.map_err(|_| BridgeError::InvalidResponse(format!("Number out of range: {}", value)))
	}

	pub fn to_u64(&self) -> Result<u64, BridgeError> {
		let value = self.to_u256()?;
		u64::try_from(value)
			.map_err(|_| BridgeError::InvalidResponse(format!("Number out of range: {}", value)))
	}
}

/// Fee entry of a quote.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayFee {
	pub amount: RelayNumber,
	#[serde(default)]
	pub currency: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelayFees {
	#[serde(default)]
	pub relayer: Option<RelayFee>,
	#[serde(default)]
	pub gas: Option<RelayFee>,
}

/// Transaction payload of a step item.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTxData {
	#[serde(default)]
	pub from: Option<Address>,
	pub to: Address,
	#[serde(default)]
	pub data: Bytes,
	#[serde(default)]
	pub value: Option<RelayNumber>,
	#[serde(default)]
	pub chain_id: Option<u64>,
	#[serde(default)]
	pub gas: Option<RelayNumber>,
	#[serde(default)]
	pub gas_price: Option<RelayNumber>,
	#[serde(default)]
	pub max_fee_per_gas: Option<RelayNumber>,
	#[serde(default)]
	pub max_priority_fee_per_gas: Option<RelayNumber>,
}

impl RelayTxData {
	/// Normalises the payload into a [`Transaction`] on `chain_id`.
	pub fn to_transaction(&self, chain_id: u64) -> Result<Transaction, BridgeError> {
		Ok(Transaction {
			to: Some(self.to),
			data: self.data.to_vec(),
			value: self
				.value
				.as_ref()
				.map(RelayNumber::to_u256)
				.transpose()?
				.unwrap_or(U256::ZERO),
			chain_id,
			nonce: None,
			gas_limit: None,
			gas_price: self.gas_price.as_ref().map(RelayNumber::to_u128).transpose()?,
			max_fee_per_gas: self
				.max_fee_per_gas
				.as_ref()
				.map(RelayNumber::to_u128)
				.transpose()?,
			max_priority_fee_per_gas: self
				.max_priority_fee_per_gas
				.as_ref()
				.map(RelayNumber::to_u128)
				.transpose()?,
		})
	}

	/// Gas limit suggested by Relay, if any.
	pub fn suggested_gas(&self) -> Result<Option<u64>, BridgeError> {
		self.gas.as_ref().map(RelayNumber::to_u64).transpose()
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayStepItem {
	#[serde(default)]
	pub status: Option<String>,
	pub data: RelayTxData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayStep {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub kind: Option<String>,
	#[serde(default)]
	pub items: Vec<RelayStepItem>,
}

/// Response of `POST /quote`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayQuoteResponse {
	#[serde(default)]
	pub steps: Vec<RelayStep>,
	#[serde(default)]
	pub fees: RelayFees,
}

impl RelayQuoteResponse {
	/// Relayer fee in wei.
	pub fn relayer_fee(&self) -> Result<U256, BridgeError> {
		self.fees
			.relayer
			.as_ref()
			.ok_or_else(|| BridgeError::InvalidResponse("Quote has no relayer fee".into()))?
			.amount
			.to_u256()
	}

	/// Payload of the first item of the first step.
	pub fn first_transaction(&self) -> Result<&RelayTxData, BridgeError> {
		self.steps
			.first()
			.and_then(|step| step.items.first())
			.map(|item| &item.data)
			.ok_or_else(|| BridgeError::InvalidResponse("Quote has no transaction steps".into()))
	}
}

/// HTTP client for the Relay API.
#[derive(Debug)]
pub struct RelayApiClient {
	clients: Vec<Client>,
	next: AtomicUsize,
	base_url: String,
}

fn default_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();
	headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
	headers.insert(ORIGIN, HeaderValue::from_static("https://relay.link"));
	headers.insert(REFERER, HeaderValue::from_static("https://relay.link/"));
	headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
	headers
}

impl RelayApiClient {
	/// Creates a client for `base_url`, with one connection pool per proxy.
	pub fn new(base_url: &str, proxies: &[String]) -> Result<Self, BridgeError> {
		let builder = || {
			Client::builder()
				.default_headers(default_headers())
				.timeout(Duration::from_secs(30))
		};

		let clients = if proxies.is_empty() {
			vec![builder()
				.build()
				.map_err(|e| BridgeError::Http(format!("Failed to create HTTP client: {}", e)))?]
		} else {
			proxies
				.iter()
				.map(|proxy| {
					let proxy = Proxy::all(proxy)
						.map_err(|e| BridgeError::Http(format!("Invalid proxy: {}", e)))?;
					builder()
						.proxy(proxy)
						.build()
						.map_err(|e| BridgeError::Http(format!("Failed to create HTTP client: {}", e)))
				})
				.collect::<Result<Vec<_>, _>>()?
		};

		tracing::debug!(
			base_url,
			clients = clients.len(),
			"Relay API client initialized"
		);

		Ok(Self {
			clients,
			next: AtomicUsize::new(0),
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	fn client(&self) -> &Client {
		let index = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
		&self.clients[index]
	}

	/// Requests a quote.
	pub async fn quote(
		&self,
		request: &RelayQuoteRequest,
	) -> Result<RelayQuoteResponse, BridgeError> {
		let url = format!("{}/quote", self.base_url);
		let response = self
			.client()
			.post(&url)
			.json(request)
			.send()
			.await
			.map_err(|e| BridgeError::Http(format!("Quote request failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let body: String = body.chars().take(300).collect();
			return Err(BridgeError::Http(format!("Quote returned {}: {}", status, body)));
		}

		response
			.json::<RelayQuoteResponse>()
			.await
			.map_err(|e| BridgeError::InvalidResponse(format!("Failed to parse quote: {}", e)))
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use alloy_primitives::address;
	use wiremock::matchers::{body_partial_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	pub(crate) fn quote_json(fee: &str, value: &str, gas_price: serde_json::Value) -> serde_json::Value {
		serde_json::json!({
			"steps": [{
				"id": "deposit",
				"kind": "transaction",
				"items": [{
					"status": "incomplete",
					"data": {
						"from": "0x1111111111111111111111111111111111111111",
						"to": "0xa5f565650890fba1824ee0f21ebbbf660a179934",
						"data": "0x58109c",
						"value": value,
						"chainId": 42161,
						"gasPrice": gas_price
					}
				}]
			}],
			"fees": {
				"relayer": { "amount": fee, "currency": { "symbol": "ETH" } }
			}
		})
	}

	#[test]
	fn test_relay_number_forms() {
		let n: RelayNumber = serde_json::from_value(serde_json::json!("1500")).unwrap();
		assert_eq!(n.to_u256().unwrap(), U256::from(1500u64));

		let n: RelayNumber = serde_json::from_value(serde_json::json!("0x05dc")).unwrap();
		assert_eq!(n.to_u256().unwrap(), U256::from(1500u64));

		let n: RelayNumber = serde_json::from_value(serde_json::json!(1500)).unwrap();
		assert_eq!(n.to_u64().unwrap(), 1500);

		let n: RelayNumber =
			serde_json::from_value(serde_json::json!({"type": "BigNumber", "hex": "0x3b9aca00"}))
				.unwrap();
		assert_eq!(n.to_u128().unwrap(), 1_000_000_000);
	}

	#[test]
	fn test_request_serialization() {
		let request = RelayQuoteRequest::bridge(
			address!("1111111111111111111111111111111111111111"),
			address!("1111111111111111111111111111111111111111"),
			42161,
			59144,
			U256::from(1000u64),
		);
		let json = serde_json::to_value(&request).unwrap();
		assert_eq!(json["tradeType"], "EXACT_OUTPUT");
		assert_eq!(json["originChainId"], "42161");
		assert_eq!(json["destinationChainId"], "59144");
		assert_eq!(json["amount"], "1000");
		assert_eq!(
			json["originCurrency"],
			"0x0000000000000000000000000000000000000000"
		);
		assert_eq!(json["usePermit"], false);
		assert_eq!(json["referrer"], "relay.link/bridge");

		let swap = RelayQuoteRequest::swap_to_native(
			Address::ZERO,
			10,
			address!("0b2c639c533813f4aa9d7837caf62653d097ff85"),
			U256::from(5u64),
		);
		assert_eq!(
			serde_json::to_value(&swap).unwrap()["tradeType"],
			"EXACT_INPUT"
		);
	}

	#[test]
	fn test_big_number_gas_price_unwrapped() {
		let response: RelayQuoteResponse = serde_json::from_value(quote_json(
			"500000000000000",
			"1000000000000000000",
			serde_json::json!({"type": "BigNumber", "hex": "0x3b9aca00"}),
		))
		.unwrap();

		assert_eq!(
			response.relayer_fee().unwrap(),
			U256::from(500_000_000_000_000u64)
		);
		let tx = response.first_transaction().unwrap().to_transaction(42161).unwrap();
		assert_eq!(tx.gas_price, Some(1_000_000_000));
		assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
		assert_eq!(tx.data, vec![0x58, 0x10, 0x9c]);
	}

	#[test]
	fn test_missing_steps_is_invalid() {
		let response: RelayQuoteResponse =
			serde_json::from_value(serde_json::json!({"steps": [], "fees": {}})).unwrap();
		assert!(matches!(
			response.first_transaction(),
			Err(BridgeError::InvalidResponse(_))
		));
		assert!(response.relayer_fee().is_err());
	}

	#[tokio::test]
	async fn test_quote_posts_to_quote_path() {
		let mock_server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(path("/quote"))
			.and(header("origin", "https://relay.link"))
			.and(body_partial_json(serde_json::json!({
				"tradeType": "EXACT_OUTPUT",
				"destinationChainId": "59144"
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(quote_json(
				"1000",
				"2000",
				serde_json::json!("1000000000"),
			)))
			.expect(1)
			.mount(&mock_server)
			.await;

		let client = RelayApiClient::new(&mock_server.uri(), &[]).unwrap();
		let request = RelayQuoteRequest::bridge(Address::ZERO, Address::ZERO, 42161, 59144, U256::from(1u64));
		let response = client.quote(&request).await.unwrap();
		assert_eq!(response.relayer_fee().unwrap(), U256::from(1000u64));
	}

	#[tokio::test]
	async fn test_quote_error_status() {
		let mock_server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(path("/quote"))
			.respond_with(ResponseTemplate::new(400).set_body_string("Amount too low"))
			.mount(&mock_server)
			.await;

		let client = RelayApiClient::new(&mock_server.uri(), &[]).unwrap();
		let request = RelayQuoteRequest::bridge(Address::ZERO, Address::ZERO, 1, 10, U256::from(1u64));
		match client.quote(&request).await {
			Err(BridgeError::Http(msg)) => assert!(msg.contains("Amount too low")),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn test_proxies_rotate() {
		let proxies = vec![
			"http://127.0.0.1:3128".to_string(),
			"http://127.0.0.1:3129".to_string(),
		];
		let client = RelayApiClient::new("https://api.relay.link/", &proxies).unwrap();
		assert_eq!(client.clients.len(), 2);
		assert_eq!(client.base_url, "https://api.relay.link");

		let first = client.client() as *const Client;
		let second = client.client() as *const Client;
		let third = client.client() as *const Client;
		assert_ne!(first, second);
		assert_eq!(first, third);
	}
}
