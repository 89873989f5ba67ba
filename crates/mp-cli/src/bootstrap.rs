use anyhow::Context;

use mp_config::MpConfig;

/// Load `.env` from the current directory, then the layered config.
pub fn load_config() -> anyhow::Result<MpConfig> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    MpConfig::load().context("failed to load milepost configuration")
}
