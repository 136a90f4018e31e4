//! Profile lookup HTTP client.
//!
//! Talks to a Farcaster profile-enrichment service (a Neynar-style API) and
//! normalizes its responses into the [`FarcasterUser`] DTO. The rest of the
//! tool never sees the service's own shapes.

use fid_config::ProfilesConfig;
use fid_types::FarcasterUser;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during profile lookups.
#[derive(Debug, Error)]
pub enum ProfileError {
	/// The HTTP request itself failed.
	#[error("HTTP error: {0}")]
	Http(String),
	/// The service answered with a non-success status.
	#[error("Profile service error: {0}")]
	Api(String),
	/// The response body did not decode into the expected shape.
	#[error("Decode error: {0}")]
	Decode(String),
}

/// Envelope the profile service wraps every user response in.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
	user: ApiUser,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUserBio {
	#[serde(default)]
	text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUserProfile {
	#[serde(default)]
	bio: ApiUserBio,
}

/// The service's user object; everything but the fid is optional in
/// practice, so missing fields normalize to empty values.
#[derive(Debug, Deserialize)]
struct ApiUser {
	fid: u64,
	#[serde(default)]
	custody_address: String,
	#[serde(default)]
	username: String,
	#[serde(default)]
	display_name: String,
	#[serde(default)]
	pfp_url: String,
	#[serde(default)]
	profile: ApiUserProfile,
	#[serde(default)]
	follower_count: u64,
	#[serde(default)]
	following_count: u64,
	#[serde(default)]
	active_status: String,
	#[serde(default)]
	power_badge: bool,
}

impl ApiUser {
	fn normalize(self) -> FarcasterUser {
		FarcasterUser {
			fid: self.fid,
			custody_address: self.custody_address,
			username: self.username,
			display_name: self.display_name,
			pfp_url: self.pfp_url,
			bio_text: self.profile.bio.text,
			follower_count: self.follower_count,
			following_count: self.following_count,
			active_status: self.active_status,
			power_badge: self.power_badge,
		}
	}
}

/// Client for the configured profile service.
pub struct ProfileClient {
	http: reqwest::Client,
	api_url: String,
	api_key: Option<String>,
}

impl ProfileClient {
	pub fn new(config: &ProfilesConfig) -> Self {
		Self {
			http: reqwest::Client::new(),
			api_url: config.api_url.trim_end_matches('/').to_string(),
			api_key: config.api_key.clone(),
		}
	}

	/// Fetches a profile by FID.
	pub async fn user_by_fid(&self, fid: u64) -> Result<FarcasterUser, ProfileError> {
		self.fetch(&format!("user-by-fid?fid={}", fid)).await
	}

	/// Fetches a profile by username.
	pub async fn user_by_username(&self, username: &str) -> Result<FarcasterUser, ProfileError> {
		self.fetch(&format!("user-by-username?username={}", username))
			.await
	}

	/// Fetches a profile by its custody address.
	pub async fn user_by_custody(&self, custody: &str) -> Result<FarcasterUser, ProfileError> {
		self.fetch(&format!("user-by-custody?custody_address={}", custody))
			.await
	}

	async fn fetch(&self, path_and_query: &str) -> Result<FarcasterUser, ProfileError> {
		let url = format!("{}/{}", self.api_url, path_and_query);

		let mut request = self.http.get(&url).header("accept", "application/json");
		if let Some(key) = &self.api_key {
			request = request.header("api_key", key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| ProfileError::Http(e.to_string()))?;

		if !response.status().is_success() {
			return Err(ProfileError::Api(format!(
				"request to {} failed with status {}",
				url,
				response.status()
			)));
		}

		let envelope: UserEnvelope = response
			.json()
			.await
			.map_err(|e| ProfileError::Decode(e.to_string()))?;

		Ok(envelope.user.normalize())
	}
}
