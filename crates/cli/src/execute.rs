use crate::commands::{generate, keygen, open, resolve_format, seal, Commands};
use crate::settings::Settings;

impl Commands {
    pub async fn execute(self, settings: Settings) -> eyre::Result<()> {
        match self {
            Commands::Generate { configs } => generate::execute(&settings, configs).await,
            Commands::Seal {
                file,
                key_ids,
                format,
                env_file,
                in_place,
            } => {
                let format = resolve_format(&file, format, env_file);
                seal::execute(&settings, &file, &key_ids, format, in_place)
            }
            Commands::Open {
                file,
                format,
                env_file,
            } => open::execute(&settings, &file, resolve_format(&file, format, env_file)),
            Commands::Keygen { id } => keygen::execute(&settings, id),
        }
    }
}
