//! Effect catalog
//!
//! Maps stable effect identifiers to bundled audio files and display names.
//! Built once at startup from the static table plus the effects directory and
//! injected wherever lookups are needed; there is no global catalog state.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One bundled sound effect
#[derive(Debug, Clone, Copy)]
pub struct EffectDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Filename relative to the effects directory
    pub file: &'static str,
}

/// Catalog entry as served to clients
#[derive(Debug, Clone, Serialize)]
pub struct EffectListing {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// The bundled effect set
pub const BUILTIN_EFFECTS: &[EffectDefinition] = &[
    EffectDefinition { id: "vine_boom", name: "Vine Boom", file: "vine-boom.mp3" },
    EffectDefinition { id: "vine_boom_spam", name: "Vine Boom Spam", file: "vine-boom-spam.mp3" },
    EffectDefinition { id: "sus_meme_sound", name: "Sus meme sound", file: "sus-meme-sound.mp3" },
    EffectDefinition { id: "sexy_sax", name: "Sexy Sax", file: "sexy-sax.mp3" },
    EffectDefinition { id: "mlg_airhorn", name: "MLG Airhorn", file: "mlg_airhorn.mp3" },
    EffectDefinition { id: "fart", name: "Fart", file: "fart.mp3" },
    EffectDefinition { id: "among_us_role_reveal", name: "Among Us Role Reveal", file: "among-us-role-reveal.mp3" },
    EffectDefinition { id: "anime_wow", name: "Anime Wow", file: "anime-wow.mp3" },
    EffectDefinition { id: "pew_pew", name: "Pew Pew", file: "pew-pew.mp3" },
    EffectDefinition { id: "rizz", name: "Rizz Sound Effect", file: "rizz.mp3" },
    EffectDefinition { id: "discord_notification", name: "Discord Notification", file: "discord-notification.mp3" },
    EffectDefinition { id: "spongebob_fail", name: "SpongeBob Fail", file: "spongebob-fail.mp3" },
    EffectDefinition { id: "metal_pipe_clang", name: "Metal Pipe Clang", file: "metal-pipe-clang.mp3" },
    EffectDefinition { id: "flashbang", name: "Flashbang", file: "flashbang.mp3" },
    EffectDefinition { id: "fart_button", name: "Fart Button", file: "fart-button.mp3" },
    EffectDefinition { id: "gayy_echo", name: "GAYY ECHO", file: "gayy-echo.mp3" },
    EffectDefinition { id: "punch", name: "Punch Sound", file: "punch.mp3" },
    EffectDefinition { id: "error_sounds", name: "Error SOUNDSS", file: "error-sounds.mp3" },
    EffectDefinition { id: "bone_crack", name: "Bone Crack", file: "bone-crack.mp3" },
    EffectDefinition { id: "ding", name: "Ding Sound Effect", file: "ding.mp3" },
    EffectDefinition { id: "dun_dun_dunnnnnnnn", name: "Dun Dun Dunnnnnnnn", file: "dun-dun-dunnnnnnnn.mp3" },
    EffectDefinition { id: "undertaker_bell", name: "The Undertaker Bell", file: "undertaker-bell.mp3" },
    EffectDefinition { id: "death_sound_fortnite", name: "Death Sound (Fortnite)", file: "death-sound-fortnite.mp3" },
    EffectDefinition { id: "a_few_moments_later", name: "A Few Moments Later (SpongeBob)", file: "a-few-moments-later.mp3" },
    EffectDefinition { id: "asian_meme_huh", name: "Asian Meme Huh?", file: "asian-meme-huh.mp3" },
    EffectDefinition { id: "goofy_ahh_car_horn", name: "Goofy Ahh Car Horn", file: "goofy-ahh-car-horn.mp3" },
    EffectDefinition { id: "taco_bell_bong", name: "Taco Bell Bong", file: "taco-bell-bong.mp3" },
    EffectDefinition { id: "apple_pay", name: "Apple Pay Sound", file: "apple-pay.mp3" },
    EffectDefinition { id: "fart_meme", name: "Fart Meme Sound", file: "fart-meme.mp3" },
    EffectDefinition { id: "galaxy_meme", name: "Galaxy Meme", file: "galaxy-meme.mp3" },
    EffectDefinition { id: "discord_call", name: "Discord Call", file: "discord-call.mp3" },
    EffectDefinition { id: "999_social_credit_siren", name: "999 Social Credit Siren", file: "999-social-credit-siren.mp3" },
    EffectDefinition {
        id: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        name: "Aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        file: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa.mp3",
    },
    EffectDefinition { id: "aww", name: "Aww", file: "aww.mp3" },
    EffectDefinition { id: "chalo", name: "Chalo", file: "chalo.mp3" },
    EffectDefinition { id: "gopgopgop", name: "GopGopGop", file: "gopgopgop.mp3" },
    EffectDefinition { id: "hub_intro_sound", name: "Hub Intro Sound", file: "hub-intro-sound.mp3" },
    EffectDefinition { id: "mac_quack", name: "Mac Quack", file: "mac-quack.mp3" },
    EffectDefinition { id: "door_knocking", name: "Door Knocking", file: "door-knocking.mp3" },
];

/// Immutable effect catalog
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    effects_dir: PathBuf,
    by_id: HashMap<&'static str, &'static EffectDefinition>,
}

impl EffectCatalog {
    /// Build the catalog over a directory of bundled effect files
    pub fn new(effects_dir: impl Into<PathBuf>) -> Self {
        Self {
            effects_dir: effects_dir.into(),
            by_id: BUILTIN_EFFECTS.iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'static EffectDefinition> {
        self.by_id.get(id).copied()
    }

    /// Lookup by bundled filename, as referenced from listing audio URLs
    pub fn find_by_file(&self, file: &str) -> Option<&'static EffectDefinition> {
        BUILTIN_EFFECTS.iter().find(|e| e.file == file)
    }

    /// Absolute path of an effect's backing file
    pub fn file_path(&self, effect: &EffectDefinition) -> PathBuf {
        self.effects_dir.join(effect.file)
    }

    pub fn effects_dir(&self) -> &Path {
        &self.effects_dir
    }

    /// All effects as client-facing listings
    pub fn list(&self) -> Vec<EffectListing> {
        BUILTIN_EFFECTS
            .iter()
            .map(|e| EffectListing {
                id: e.id,
                name: e.name,
                audio_url: format!("/effects/{}", e.file),
            })
            .collect()
    }
}
