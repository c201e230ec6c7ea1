use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_ledger_schema::{Permissions, RolePermissions, Roles};

#[derive(DeriveMigrationName)]
pub struct Migration;

// Stable ids so that grants and seeded users can refer to roles across databases.
const ROLES: &[(&str, &str, &str)] = &[
    (
        "0b9d7f4e-3c1a-4e8b-9f2d-6a5c4b3a2e10",
        "Admin",
        "Administrator with full access",
    ),
    (
        "5e2f8a1c-7d4b-4c9e-a3f6-1b0d9e8c7f21",
        "Mahasiswa",
        "Student who reports achievements",
    ),
    (
        "9c4a6e2d-1f8b-4a7c-b5e3-2d1f0a9b8c32",
        "Dosen Wali",
        "Academic advisor who verifies advisee achievements",
    ),
];

const PERMISSIONS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "a1f0c2e4-0001-4d3b-8c5a-000000000001",
        "achievement:create",
        "achievement",
        "create",
        "Create achievements",
    ),
    (
        "a1f0c2e4-0002-4d3b-8c5a-000000000002",
        "achievement:read",
        "achievement",
        "read",
        "Read achievements",
    ),
    (
        "a1f0c2e4-0003-4d3b-8c5a-000000000003",
        "achievement:update",
        "achievement",
        "update",
        "Update and submit achievements",
    ),
    (
        "a1f0c2e4-0004-4d3b-8c5a-000000000004",
        "achievement:delete",
        "achievement",
        "delete",
        "Delete draft achievements",
    ),
    (
        "a1f0c2e4-0005-4d3b-8c5a-000000000005",
        "achievement:verify",
        "achievement",
        "verify",
        "Verify or reject submitted achievements",
    ),
    (
        "a1f0c2e4-0006-4d3b-8c5a-000000000006",
        "user:manage",
        "user",
        "manage",
        "Manage users",
    ),
];

const GRANTS: &[(&str, &[&str])] = &[
    (
        "Admin",
        &[
            "achievement:create",
            "achievement:read",
            "achievement:update",
            "achievement:delete",
            "achievement:verify",
            "user:manage",
        ],
    ),
    (
        "Mahasiswa",
        &[
            "achievement:create",
            "achievement:read",
            "achievement:update",
            "achievement:delete",
        ],
    ),
    ("Dosen Wali", &["achievement:read", "achievement:verify"]),
];

fn role_id(name: &str) -> Option<&'static str> {
    ROLES.iter().find(|(_, n, _)| *n == name).map(|(id, _, _)| *id)
}

fn permission_id(name: &str) -> Option<&'static str> {
    PERMISSIONS
        .iter()
        .find(|(_, n, _, _, _)| *n == name)
        .map(|(id, _, _, _, _)| *id)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut roles = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Id, Roles::Name, Roles::Description, Roles::CreatedAt])
            .to_owned();
        for (id, name, description) in ROLES {
            roles.values_panic([(*id).into(), (*name).into(), (*description).into(), 0.into()]);
        }
        manager.exec_stmt(roles).await?;

        let mut permissions = Query::insert()
            .into_table(Permissions::Table)
            .columns([
                Permissions::Id,
                Permissions::Name,
                Permissions::Resource,
                Permissions::Action,
                Permissions::Description,
            ])
            .to_owned();
        for (id, name, resource, action, description) in PERMISSIONS {
            permissions.values_panic([
                (*id).into(),
                (*name).into(),
                (*resource).into(),
                (*action).into(),
                (*description).into(),
            ]);
        }
        manager.exec_stmt(permissions).await?;

        let mut grants = Query::insert()
            .into_table(RolePermissions::Table)
            .columns([RolePermissions::RoleId, RolePermissions::PermissionId])
            .to_owned();
        for (role, permission_names) in GRANTS {
            let role_id = role_id(role)
                .ok_or_else(|| DbErr::Migration(format!("unknown role {role}")))?;
            for permission in *permission_names {
                let permission_id = permission_id(permission)
                    .ok_or_else(|| DbErr::Migration(format!("unknown permission {permission}")))?;
                grants.values_panic([role_id.into(), permission_id.into()]);
            }
        }
        manager.exec_stmt(grants).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(RolePermissions::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Permissions::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Roles::Table).to_owned())
            .await
    }
}
