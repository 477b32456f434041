//! User administration handlers.

use secrecy::SecretString;
use tabled::Tabled;

use skillmart_core::{
    Command as CoreCommand, CommandResult, CreateUserRequest, EntityId, Role, RoleProfile,
    UpdateUserRequest, User, UserFilter, UserQuery,
};

use crate::cli::{GlobalOpts, RoleArg, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::{Backend, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.profile.role_name(),
            active: output::yes_no(u.active),
        }
    }
}

pub(crate) fn user_detail(u: &User) -> String {
    let mut pairs = vec![
        ("ID", u.id.to_string()),
        ("Name", u.name.clone()),
        ("Email", u.email.clone()),
        ("Role", u.profile.role_name()),
        ("Active", output::yes_no(u.active)),
    ];
    match &u.profile {
        RoleProfile::Student {
            education: Some(education),
        } => pairs.push(("Education", education.clone())),
        RoleProfile::Instructor { expertise, bio } => {
            if !expertise.is_empty() {
                pairs.push(("Expertise", expertise.join(", ")));
            }
            if let Some(bio) = bio {
                pairs.push(("Bio", bio.clone()));
            }
        }
        _ => {}
    }
    if let Some(created) = u.created_at {
        pairs.push(("Joined", created.format("%Y-%m-%d").to_string()));
    }
    output::detail_lines(&pairs)
}

fn role(arg: RoleArg) -> Role {
    match arg {
        RoleArg::Student => Role::Student,
        RoleArg::Instructor => Role::Instructor,
        RoleArg::Admin => Role::Admin,
    }
}

/// Fold the role-specific flags into a profile, refusing flags that do
/// not belong to the chosen role.
pub(crate) fn role_profile(
    arg: RoleArg,
    education: Option<String>,
    expertise: Vec<String>,
    bio: Option<String>,
) -> Result<RoleProfile, CliError> {
    let misplaced = |field: &str, owner: &str| CliError::Validation {
        field: field.into(),
        reason: format!("only applies to {owner} accounts"),
    };
    match arg {
        RoleArg::Student => {
            if !expertise.is_empty() {
                return Err(misplaced("expertise", "instructor"));
            }
            if bio.is_some() {
                return Err(misplaced("bio", "instructor"));
            }
            Ok(RoleProfile::Student { education })
        }
        RoleArg::Instructor => {
            if education.is_some() {
                return Err(misplaced("education", "student"));
            }
            Ok(RoleProfile::Instructor { expertise, bio })
        }
        RoleArg::Admin => {
            if education.is_some() {
                return Err(misplaced("education", "student"));
            }
            if !expertise.is_empty() || bio.is_some() {
                return Err(misplaced("expertise", "instructor"));
            }
            Ok(RoleProfile::Admin)
        }
    }
}

pub(crate) fn prompt_new_password() -> Result<SecretString, CliError> {
    if let Ok(pw) = std::env::var(skillmart_config::PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }
    let first = rpassword::prompt_password("Password for the new account: ")
        .map_err(util::prompt_err)?;
    let second = rpassword::prompt_password("Repeat password: ").map_err(util::prompt_err)?;
    if first != second {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(SecretString::from(first))
}

fn print_user(user: &User, global: &GlobalOpts) {
    let out = output::render_single(&global.output, user, user_detail, |u| u.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(backend: &Backend, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cmd = match args.command {
        UsersCommand::List {
            role: role_arg,
            active,
            inactive,
            search,
        } => {
            let query = UserQuery {
                role: role_arg.map(|r| role(r).to_string()),
                search: search.clone(),
            };
            // The backend filters by role and search; activity is local.
            let filter = UserFilter {
                role: role_arg.map(role),
                active: if active {
                    Some(true)
                } else if inactive {
                    Some(false)
                } else {
                    None
                },
                search,
            };
            let session = backend.session().await?;
            let users = util::with_spinner(global, "Loading users", session.users(&query)).await?;
            let users: Vec<User> = users.into_iter().filter(|u| filter.matches(u)).collect();
            let out = output::render_list(
                &global.output,
                &users,
                |u| UserRow::from(u),
                |u| u.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        UsersCommand::Get { id } => {
            let session = backend.session().await?;
            let user =
                util::with_spinner(global, "Loading user", session.user(&EntityId::from(id)))
                    .await?;
            print_user(&user, global);
            return Ok(());
        }

        UsersCommand::Create {
            name,
            email,
            role: role_arg,
            education,
            expertise,
            bio,
        } => {
            let profile = role_profile(role_arg, education, expertise, bio)?;
            let request = CreateUserRequest {
                name,
                email,
                password: SecretString::from(String::new()),
                profile,
            };
            // Catch form errors before asking for a password.
            let probe = CoreCommand::CreateUser(CreateUserRequest {
                password: SecretString::from("placeholder".to_owned()),
                ..request.clone()
            });
            probe.validate(chrono::Utc::now())?;
            CoreCommand::CreateUser(CreateUserRequest {
                password: prompt_new_password()?,
                ..request
            })
        }

        UsersCommand::Update {
            id,
            name,
            email,
            role: role_arg,
            education,
            expertise,
            bio,
        } => {
            let update = UpdateUserRequest {
                name,
                email,
                role: role_arg.map(role),
                education,
                expertise,
                bio,
            };
            if update.is_empty() {
                return Err(CliError::InvalidInput {
                    message: "nothing to update; pass at least one field flag".into(),
                });
            }
            CoreCommand::UpdateUser {
                id: EntityId::from(id),
                update,
            }
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}?"), "users delete", global.yes)? {
                return Ok(());
            }
            CoreCommand::DeleteUser {
                id: EntityId::from(id),
            }
        }

        UsersCommand::Activate { id } => CoreCommand::SetUserActive {
            id: EntityId::from(id),
            active: true,
        },

        UsersCommand::Deactivate { id } => CoreCommand::SetUserActive {
            id: EntityId::from(id),
            active: false,
        },
    };

    let name = cmd.name();
    match util::with_spinner(global, "Saving", backend.execute(cmd)).await? {
        CommandResult::User(user) => {
            util::notice(global, &format!("✓ {name}: {}", user.id));
            print_user(&user, global);
        }
        _ => util::notice(global, &format!("✓ {name}")),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn student_flags_build_student_profile() {
        let profile = role_profile(RoleArg::Student, Some("BSc".into()), vec![], None).unwrap();
        assert_eq!(
            profile,
            RoleProfile::Student {
                education: Some("BSc".into())
            }
        );
    }

    #[test]
    fn instructor_fields_rejected_for_students() {
        let err = role_profile(RoleArg::Student, None, vec!["rust".into()], None).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "expertise"));
    }

    #[test]
    fn education_rejected_for_admins() {
        let err = role_profile(RoleArg::Admin, Some("PhD".into()), vec![], None).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "education"));
    }

    #[test]
    fn detail_lists_instructor_expertise() {
        let user = User {
            id: EntityId::from("u7"),
            name: "Grace".into(),
            email: "grace@example.com".into(),
            active: true,
            profile: RoleProfile::Instructor {
                expertise: vec!["compilers".into(), "cobol".into()],
                bio: None,
            },
            avatar: None,
            created_at: None,
        };
        let detail = user_detail(&user);
        assert!(detail.contains("compilers, cobol"));
        assert!(detail.contains("instructor"));
    }
}
