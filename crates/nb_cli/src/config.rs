use nb_core::{Error, Result};
use nb_inference::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TOPIC};
use nb_storage::OAuthCredentials;
use nb_web::DEFAULT_PORT;
use std::path::PathBuf;
use tracing::debug;

/// Settings read from the environment (and any `.env` file found). Not
/// `Debug`, it carries secrets.
#[derive(Clone)]
pub struct Config {
    pub bot_token: Option<String>,
    pub inference: nb_inference::Config,
    pub drive_folder_id: Option<String>,
    pub google_credentials_json: Option<String>,
    pub google_client: Option<(String, String, String)>,
    pub topic: String,
    pub staging_dir: PathBuf,
    pub port: u16,
}

impl Config {
    /// Load `.env` files, then read the process environment.
    pub fn load() -> Result<Self> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let google_client = match (
            get("GOOGLE_CLIENT_ID"),
            get("GOOGLE_CLIENT_SECRET"),
            get("GOOGLE_REFRESH_TOKEN"),
        ) {
            (Some(id), Some(secret), Some(refresh)) => Some((id, secret, refresh)),
            _ => None,
        };

        Ok(Self {
            bot_token: get("BOT_TOKEN"),
            inference: nb_inference::Config {
                api_key: get("OPENAI_API_KEY"),
                model_name: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            drive_folder_id: get("GOOGLE_DRIVE_FOLDER_ID"),
            google_credentials_json: get("GOOGLE_CREDENTIALS_JSON"),
            google_client,
            topic: get("NEWS_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
            staging_dir: get("ARCHIVE_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            port,
        })
    }

    pub fn require_bot_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| Error::Config("BOT_TOKEN is not set".to_string()))
    }

    pub fn require_drive_folder(&self) -> Result<&str> {
        self.drive_folder_id
            .as_deref()
            .ok_or_else(|| Error::Config("GOOGLE_DRIVE_FOLDER_ID is not set".to_string()))
    }

    /// The credentials JSON wins over the discrete client values.
    pub fn drive_credentials(&self) -> Result<OAuthCredentials> {
        if let Some(json) = &self.google_credentials_json {
            return OAuthCredentials::from_json(json)
                .map_err(|e| Error::Config(format!("GOOGLE_CREDENTIALS_JSON is invalid: {}", e)));
        }
        match &self.google_client {
            Some((id, secret, refresh)) => Ok(OAuthCredentials::new(
                id.clone(),
                secret.clone(),
                refresh.clone(),
            )),
            None => Err(Error::Config(
                "Set GOOGLE_CREDENTIALS_JSON or GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN"
                    .to_string(),
            )),
        }
    }
}

/// First `.env` found wins: current directory, `<config dir>/notucias`, home.
fn load_env_files() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
        return;
    }

    let candidates = [
        dirs::config_dir().map(|d| d.join("notucias").join(".env")),
        dirs::home_dir().map(|d| d.join(".env")),
    ];
    for path in candidates.into_iter().flatten() {
        if path.exists() && dotenvy::from_path(&path).is_ok() {
            debug!("Loaded environment from {}", path.display());
            return;
        }
    }
}
