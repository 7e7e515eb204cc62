//! Cleanup plan generation
//!
//! Plans come in three tiers built from the analysis result. The
//! rule-based generator is the default and the fallback; AI generation
//! is attempted only when enabled, and any provider failure silently
//! drops back to the rules so the endpoint always produces plans.

mod catalog;

pub use catalog::PlanCatalog;

use chrono::Utc;

use crate::ai::{prompts, AiClient};
use crate::config::Config;
use crate::models::{
    ActionType, AnalysisResult, ConsumerType, Plan, PlanAction, RiskLevel, SpaceConsumer,
    UserSettings,
};

pub struct PlanGenerator {
    config: Config,
}

impl PlanGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generate the three-tier plan set, optionally via an AI provider
    pub async fn generate_plans(
        &self,
        analysis: &AnalysisResult,
        settings: &UserSettings,
        force_ai: Option<bool>,
    ) -> Vec<Plan> {
        let use_ai = force_ai.unwrap_or(settings.use_ai);

        if use_ai {
            match self.generate_with_ai(analysis, settings).await {
                Ok(plans) => return plans,
                Err(e) => {
                    log::warn!("[PLANNER] AI generation failed, using rules: {}", e);
                }
            }
        }

        self.generate_rule_based(analysis)
    }

    async fn generate_with_ai(
        &self,
        analysis: &AnalysisResult,
        settings: &UserSettings,
    ) -> Result<Vec<Plan>, String> {
        let client = AiClient::from_settings(settings, &self.config)?;
        let prompt = prompts::build_plan_prompt(
            analysis,
            &self.config.default_target_drive,
            &self.config.backup_location,
        );
        client.generate_plans(&prompt).await
    }

    /// Deterministic tiering over the discovered consumers
    pub fn generate_rule_based(&self, analysis: &AnalysisResult) -> Vec<Plan> {
        let consumers = &analysis.top_consumers;
        let target = &self.config.default_target_drive;

        let docker = consumers
            .iter()
            .find(|c| c.consumer_type == ConsumerType::Docker);
        let wsl: Vec<&SpaceConsumer> = consumers
            .iter()
            .filter(|c| c.consumer_type == ConsumerType::Wsl)
            .collect();
        let caches: Vec<&SpaceConsumer> = consumers
            .iter()
            .filter(|c| c.consumer_type == ConsumerType::Cache)
            .collect();
        let temps: Vec<&SpaceConsumer> = consumers
            .iter()
            .filter(|c| c.consumer_type == ConsumerType::Temp)
            .collect();
        let downloads = consumers
            .iter()
            .find(|c| c.consumer_type == ConsumerType::Downloads);

        // Conservative: caches and temp files only
        let mut conservative_actions = Vec::new();
        for cache in caches.iter().take(3) {
            conservative_actions.push(PlanAction {
                id: format!("conservative_action_{}", conservative_actions.len() + 1),
                action_type: ActionType::Cleanup,
                description: format!("Clear {}", cache.name),
                source_path: Some(cache.path.clone()),
                target_path: None,
                command: None,
                size_bytes: cache.size_bytes,
                safety_explanation: "Browsers will rebuild cache automatically".to_string(),
                rollback_option: "Not needed (cache data)".to_string(),
                estimated_seconds: 120,
            });
        }
        for temp in temps.iter().take(2) {
            conservative_actions.push(PlanAction {
                id: format!("conservative_action_{}", conservative_actions.len() + 1),
                action_type: ActionType::Cleanup,
                description: format!("Clear Temporary Files: {}", temp.name),
                source_path: Some(temp.path.clone()),
                target_path: None,
                command: None,
                size_bytes: temp.size_bytes,
                safety_explanation: "Safe to delete temporary files".to_string(),
                rollback_option: "Not needed (temporary data)".to_string(),
                estimated_seconds: 180,
            });
        }
        let conservative_space: u64 = conservative_actions.iter().map(|a| a.size_bytes).sum();

        // Balanced: conservative plus docker relocation and prune
        let mut balanced_actions = conservative_actions.clone();
        if let Some(docker) = docker {
            balanced_actions.push(PlanAction {
                id: format!("balanced_action_{}", balanced_actions.len() + 1),
                action_type: ActionType::Move,
                description: "Move Docker Desktop data".to_string(),
                source_path: Some(docker.path.clone()),
                target_path: Some(join_target(target, "Docker")),
                command: None,
                size_bytes: docker.size_bytes,
                safety_explanation:
                    "Symlink maintains compatibility; Docker will function normally".to_string(),
                rollback_option: "Reverse move and restore symlink".to_string(),
                estimated_seconds: 600,
            });
            balanced_actions.push(PlanAction {
                id: format!("balanced_action_{}", balanced_actions.len() + 1),
                action_type: ActionType::Prune,
                description: "Clean Docker unused images and containers".to_string(),
                source_path: None,
                target_path: None,
                command: Some("docker system prune -af --volumes".to_string()),
                // prune reclaims roughly a third of the data dir
                size_bytes: docker.size_bytes * 3 / 10,
                safety_explanation: "Only removes unused Docker resources".to_string(),
                rollback_option: "Images can be re-downloaded".to_string(),
                estimated_seconds: 300,
            });
        }
        let balanced_space: u64 = balanced_actions.iter().map(|a| a.size_bytes).sum();

        // Aggressive: balanced plus WSL and downloads relocation
        let mut aggressive_actions = balanced_actions.clone();
        for distro in wsl.iter().take(2) {
            let distro_name = distro.name.trim_start_matches("WSL - ").to_string();
            aggressive_actions.push(PlanAction {
                id: format!("aggressive_action_{}", aggressive_actions.len() + 1),
                action_type: ActionType::ExportImportWsl,
                description: format!("Relocate WSL: {}", distro_name),
                source_path: Some(distro.path.clone()),
                target_path: Some(join_target(target, &format!("WSL/{}", distro_name))),
                command: None,
                size_bytes: distro.size_bytes,
                safety_explanation: "WSL export/import preserves all data".to_string(),
                rollback_option: "Re-import from backup tar".to_string(),
                estimated_seconds: 900,
            });
        }
        if let Some(downloads) = downloads {
            aggressive_actions.push(PlanAction {
                id: format!("aggressive_action_{}", aggressive_actions.len() + 1),
                action_type: ActionType::Move,
                description: "Relocate Downloads folder".to_string(),
                source_path: Some(downloads.path.clone()),
                target_path: Some(join_target(target, "Downloads")),
                command: None,
                size_bytes: downloads.size_bytes,
                safety_explanation:
                    "Symlink maintains file access; all programs work normally".to_string(),
                rollback_option: "Reverse move and restore symlink".to_string(),
                estimated_seconds: 300,
            });
        }
        let aggressive_space: u64 = aggressive_actions.iter().map(|a| a.size_bytes).sum();

        vec![
            build_plan(
                "conservative",
                "Conservative",
                conservative_space,
                RiskLevel::Low,
                "Clean temporary files and caches only. No files are moved or deleted \
                 permanently. Safe for all users.",
                false,
                conservative_actions,
            ),
            build_plan(
                "balanced",
                "Balanced",
                balanced_space,
                RiskLevel::Medium,
                "Recommended approach. Cleans caches and temp files, relocates Docker to \
                 free up the primary drive. Uses symlinks for compatibility. Includes \
                 Docker cleanup.",
                true,
                balanced_actions,
            ),
            build_plan(
                "aggressive",
                "Aggressive",
                aggressive_space,
                RiskLevel::High,
                "Maximum space savings. Relocates Docker, WSL distributions, and the \
                 Downloads folder. Uses symlinks and WSL export/import. Requires more \
                 time but frees the most space.",
                false,
                aggressive_actions,
            ),
        ]
    }
}

fn build_plan(
    id: &str,
    name: &str,
    space: u64,
    risk: RiskLevel,
    rationale: &str,
    recommended: bool,
    actions: Vec<PlanAction>,
) -> Plan {
    let estimated_minutes = actions.iter().map(|a| a.estimated_seconds).sum::<u64>() / 60;
    Plan {
        id: id.to_string(),
        name: name.to_string(),
        space_saved_bytes: space,
        risk_level: risk,
        estimated_minutes,
        rationale: rationale.to_string(),
        actions,
        recommended,
        created_at: Utc::now(),
    }
}

/// Join a relocation target onto a drive root, keeping the drive's
/// native separator ("D:" stays Windows-style).
fn join_target(target_drive: &str, name: &str) -> String {
    let base = target_drive.trim_end_matches(['\\', '/']);
    if base.ends_with(':') {
        format!("{}\\{}", base, name.replace('/', "\\"))
    } else {
        format!("{}/{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn consumer(name: &str, consumer_type: ConsumerType, size: u64) -> SpaceConsumer {
        SpaceConsumer {
            name: name.to_string(),
            path: format!("/home/user/{}", name),
            size_bytes: size,
            consumer_type,
            last_modified: None,
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            drives: Vec::new(),
            top_consumers: vec![
                consumer("Docker Desktop", ConsumerType::Docker, 50_000_000_000),
                consumer("WSL - Ubuntu", ConsumerType::Wsl, 20_000_000_000),
                consumer("Chrome Cache", ConsumerType::Cache, 5_000_000_000),
                consumer("Temp - Temp", ConsumerType::Temp, 3_000_000_000),
                consumer("Downloads", ConsumerType::Downloads, 10_000_000_000),
            ],
            total_recoverable_bytes: 88_000_000_000,
            has_imbalance: true,
            imbalance_message: None,
            analyzed_at: Utc::now(),
        }
    }

    fn generator() -> PlanGenerator {
        PlanGenerator::new(Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            data_dir: PathBuf::from("./data"),
            scan_mounts: vec![PathBuf::from("/")],
            allowed_origin: String::new(),
            openai_api_key: String::new(),
            anthropic_api_key: String::new(),
            default_target_drive: "D:".to_string(),
            backup_location: "D:\\Backups".to_string(),
            dry_run_step_delay_ms: 0,
        })
    }

    #[test]
    fn test_three_tiers_are_generated() {
        let plans = generator().generate_rule_based(&analysis());
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].id, "conservative");
        assert_eq!(plans[1].id, "balanced");
        assert_eq!(plans[2].id, "aggressive");
        assert!(plans[1].recommended);
        assert!(!plans[0].recommended);
    }

    #[test]
    fn test_conservative_only_cleans() {
        let plans = generator().generate_rule_based(&analysis());
        let conservative = &plans[0];
        assert_eq!(conservative.risk_level, RiskLevel::Low);
        assert!(conservative
            .actions
            .iter()
            .all(|a| a.action_type == ActionType::Cleanup));
        assert!(conservative
            .actions
            .iter()
            .all(|a| a.source_path.is_some()));
    }

    #[test]
    fn test_balanced_extends_conservative_with_docker() {
        let plans = generator().generate_rule_based(&analysis());
        let conservative = &plans[0];
        let balanced = &plans[1];
        assert!(balanced.actions.len() > conservative.actions.len());
        assert!(balanced
            .actions
            .iter()
            .any(|a| a.action_type == ActionType::Move));
        let prune = balanced
            .actions
            .iter()
            .find(|a| a.action_type == ActionType::Prune)
            .expect("docker prune action");
        assert!(prune.command.as_ref().unwrap().contains("docker system prune"));
    }

    #[test]
    fn test_aggressive_relocates_wsl_and_downloads() {
        let plans = generator().generate_rule_based(&analysis());
        let aggressive = &plans[2];
        assert_eq!(aggressive.risk_level, RiskLevel::High);
        let wsl = aggressive
            .actions
            .iter()
            .find(|a| a.action_type == ActionType::ExportImportWsl)
            .expect("wsl relocation");
        assert_eq!(wsl.target_path.as_deref(), Some("D:\\WSL\\Ubuntu"));
        assert!(aggressive
            .actions
            .iter()
            .any(|a| a.description.contains("Downloads")));
    }

    #[test]
    fn test_savings_grow_with_risk() {
        let plans = generator().generate_rule_based(&analysis());
        assert!(plans[0].space_saved_bytes <= plans[1].space_saved_bytes);
        assert!(plans[1].space_saved_bytes <= plans[2].space_saved_bytes);
    }

    #[test]
    fn test_no_consumers_yields_empty_actions() {
        let empty = AnalysisResult {
            top_consumers: Vec::new(),
            total_recoverable_bytes: 0,
            ..analysis()
        };
        let plans = generator().generate_rule_based(&empty);
        assert_eq!(plans.len(), 3);
        assert!(plans.iter().all(|p| p.actions.is_empty()));
    }

    #[test]
    fn test_join_target_respects_drive_style() {
        assert_eq!(join_target("D:", "Docker"), "D:\\Docker");
        assert_eq!(join_target("D:\\", "WSL/Ubuntu"), "D:\\WSL\\Ubuntu");
        assert_eq!(join_target("/mnt/bulk", "Docker"), "/mnt/bulk/Docker");
    }
}
