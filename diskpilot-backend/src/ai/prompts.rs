//! Prompt template for AI plan generation

use crate::models::AnalysisResult;

const PLAN_GENERATION_PROMPT: &str = r#"You are a storage optimization expert. Analyze the following drive usage data and generate 3 cleanup plans.

Drive Analysis:
{drive_data}

Top Space Consumers:
{consumers_data}

User Settings:
- Primary target drive: {target_drive}
- Backup location: {backup_location}

Generate 3 plans with the following IDs:
1. "conservative" - Conservative (low risk, basic cleanup)
2. "balanced" - Balanced (medium risk, recommended)
3. "aggressive" - Aggressive (high risk, maximum savings)

For each plan, provide:
- Specific actions (MOVE, DELETE_TO_RECYCLE, CLEANUP, PRUNE, EXPORT_IMPORT_WSL)
- Space savings estimate
- Risk assessment
- Detailed rationale
- Safety explanations

Return ONLY valid JSON matching this schema:
[
  {
    "id": "conservative",
    "name": "Conservative",
    "space_saved_bytes": 45200000000,
    "risk_level": "low",
    "estimated_minutes": 15,
    "rationale": "Clean temporary files and caches only...",
    "recommended": false,
    "actions": [
      {
        "id": "action_1",
        "type": "CLEANUP",
        "description": "Clear Browser Caches",
        "source_path": "/home/user/.cache",
        "size_bytes": 8900000000,
        "safety_explanation": "Browsers will rebuild cache automatically",
        "rollback_option": "Not needed (cache data)",
        "estimated_seconds": 120
      }
    ]
  }
]

Important:
- Use actual byte values from the provided data
- Be specific with paths when suggesting MOVE operations
- Conservative plan should only clean caches and temp files
- Balanced plan can move Docker/WSL and clean more aggressively
- Aggressive plan can relocate user folders and do extensive cleanup
- Mark "balanced" plan as recommended: true"#;

/// Render the plan-generation prompt for an analysis result
pub fn build_plan_prompt(
    analysis: &AnalysisResult,
    target_drive: &str,
    backup_location: &str,
) -> String {
    let drive_data = serde_json::to_string_pretty(&analysis.drives).unwrap_or_default();
    let consumers_data =
        serde_json::to_string_pretty(&analysis.top_consumers).unwrap_or_default();

    PLAN_GENERATION_PROMPT
        .replace("{drive_data}", &drive_data)
        .replace("{consumers_data}", &consumers_data)
        .replace("{target_drive}", target_drive)
        .replace("{backup_location}", backup_location)
}
