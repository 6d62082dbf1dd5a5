// ==========================================
// 仓储收货定位系统 - 管理命令入口
// ==========================================
// 用法:
//   warehouse-slotting                              显示配置与数据库信息
//   warehouse-slotting import-cubage <file>         批量导入尺寸主数据 (.csv/.xlsx)
//   warehouse-slotting save-user <id> <upin> <secret> [name]
//   warehouse-slotting set-config <key> <value>
// ==========================================

use warehouse_slotting::api::SaveUserRequest;
use warehouse_slotting::app::{get_default_db_path, AppState};
use warehouse_slotting::i18n::t_with_args;
use warehouse_slotting::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - v{}", warehouse_slotting::APP_NAME, warehouse_slotting::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("import-cubage") => {
            let file = args.get(1).ok_or("用法: import-cubage <file>")?;
            let report = state.cubage_importer.import_file(file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            println!(
                "{}",
                t_with_args(
                    "import.finished",
                    &[
                        ("imported", &report.imported.to_string()),
                        ("rejected", &report.rejected.len().to_string()),
                    ],
                )
            );
        }
        Some("save-user") => {
            let (id, upin, secret) = match (args.get(1), args.get(2), args.get(3)) {
                (Some(id), Some(upin), Some(secret)) => (id, upin, secret),
                _ => return Err("用法: save-user <id> <upin> <secret> [name]".into()),
            };
            let outcome = state.user_api.save_user(SaveUserRequest {
                id: id.clone(),
                upin: upin.clone(),
                secret: secret.clone(),
                name: args.get(4).cloned(),
            })?;
            println!("{}", outcome.as_str());
        }
        Some("set-config") => {
            let (key, value) = match (args.get(1), args.get(2)) {
                (Some(k), Some(v)) => (k, v),
                _ => return Err("用法: set-config <key> <value>".into()),
            };
            state.config_manager.set_config_value(key, value)?;
        }
        Some(other) => return Err(format!("未知命令: {}", other).into()),
        None => {
            println!("{}", serde_json::to_string_pretty(&state.settings)?);
            println!("{}", state.config_manager.get_config_snapshot()?);
        }
    }

    Ok(())
}
