use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;

// 导入 commands 模块
mod commands;
mod setup;

use setup::{initialize_app, InitializationContext};

#[derive(Parser)]
#[command(name = "houdini-launcher", version, about = "Houdini 插件包开关与预设管理")]
struct Cli {
    /// 配置根目录（包含 packages 子目录），覆盖自动查找结果
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 列出所有包
    Packages {
        /// 按包名或路径筛选
        #[arg(short, long)]
        search: Option<String>,
    },
    /// 启用包
    Enable { name: String },
    /// 禁用包
    Disable { name: String },
    /// 列出收藏
    Favorites,
    /// 切换包的收藏状态
    Favorite { name: String },
    /// 列出预设
    Presets,
    /// 预设操作
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// 配置根目录
    Root {
        #[command(subcommand)]
        action: RootAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// 用当前已启用的包创建预设
    Capture {
        name: String,
        /// 预设对应的 Houdini 版本
        #[arg(long, default_value = "")]
        houdini: String,
    },
    /// 应用预设，未指定名称时应用默认预设
    Apply { name: Option<String> },
    /// 删除预设
    Delete { name: String },
    /// 设为默认预设（同时用当前已启用的包覆盖其内容）
    Default { name: String },
}

#[derive(Subcommand)]
enum RootAction {
    /// 显示当前使用的配置根目录
    Discover,
    /// 保存配置根目录，供下次启动使用
    Save { path: Option<PathBuf> },
}

async fn run(ctx: &InitializationContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Packages { search } => commands::list_packages(ctx, search.as_deref()).await,
        Command::Enable { name } => commands::set_package(ctx, &name, true).await,
        Command::Disable { name } => commands::set_package(ctx, &name, false).await,
        Command::Favorites => commands::list_favorites(ctx).await,
        Command::Favorite { name } => commands::toggle_favorite(ctx, &name).await,
        Command::Presets => commands::list_presets(ctx).await,
        Command::Preset { action } => match action {
            PresetAction::Capture { name, houdini } => {
                commands::capture_preset(ctx, &name, &houdini).await
            }
            PresetAction::Apply { name } => commands::apply_preset(ctx, name.as_deref()).await,
            PresetAction::Delete { name } => commands::delete_preset(ctx, &name).await,
            PresetAction::Default { name } => commands::set_default_preset(ctx, &name).await,
        },
        Command::Root { action } => match action {
            RootAction::Discover => commands::show_root(ctx),
            RootAction::Save { path } => commands::save_root(ctx, path),
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let ctx = initialize_app(cli.root, cli.verbose);

    if let Err(e) = run(&ctx, cli.command).await {
        tracing::error!(error = ?e, "命令执行失败");
        eprintln!("错误: {e:#}");
        exit(1);
    }
}
