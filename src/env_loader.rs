use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(app_home: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    let base = app_home.or(home_dir)?;
    Some(base.join("moonwatch/.env"))
}

/// Load the model credential into the environment at process start.
///
/// Tries `.env` in the working directory first, then
/// `$MOONWATCH_HOME/moonwatch/.env` (or the same path under the home
/// directory). Missing files are not an error.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("MOONWATCH_HOME").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}
