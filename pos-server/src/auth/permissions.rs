//! Permission Definitions
//!
//! ## 设计原则
//! - 点单、结账、打卡：登录即可使用
//! - 日结与报表、代他人打卡：单独授权

/// Run the day close and resume a stuck one
pub const REPORTS_GENERATE: &str = "reports:generate";
/// Read EoD reports and the receipt history
pub const REPORTS_VIEW: &str = "reports:view";
/// Force-close shifts and act on other employees' ledgers
pub const SHIFTS_MANAGE: &str = "shifts:manage";

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[REPORTS_GENERATE, REPORTS_VIEW, SHIFTS_MANAGE];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理角色默认权限（全部可配置权限）
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

/// 服务员默认权限（无）
pub const DEFAULT_WAITER_PERMISSIONS: &[&str] = &[];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let permissions = match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS,
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "waiter" => DEFAULT_WAITER_PERMISSIONS,
        _ => &[],
    };
    permissions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions() {
        assert_eq!(get_default_permissions("admin"), vec!["all".to_string()]);
        assert!(get_default_permissions("manager").contains(&REPORTS_GENERATE.to_string()));
        assert!(get_default_permissions("waiter").is_empty());
        assert!(get_default_permissions("unknown").is_empty());
    }
}
