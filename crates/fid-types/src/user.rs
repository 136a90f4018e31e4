//! The normalized Farcaster profile DTO.

use serde::{Deserialize, Serialize};

/// A Farcaster user profile as consumed by this tool.
///
/// Profile-enrichment services return richer objects; everything is
/// normalized down to this shape at the HTTP boundary and treated as opaque
/// from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterUser {
	/// The on-chain account identifier.
	pub fid: u64,
	/// The wallet currently holding the account.
	pub custody_address: String,
	pub username: String,
	pub display_name: String,
	#[serde(default)]
	pub pfp_url: String,
	#[serde(default)]
	pub bio_text: String,
	#[serde(default)]
	pub follower_count: u64,
	#[serde(default)]
	pub following_count: u64,
	#[serde(default)]
	pub active_status: String,
	#[serde(default)]
	pub power_badge: bool,
}
