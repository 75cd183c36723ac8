//! JSON API endpoints
//!
//! One handler per route. Every response carries `success` plus a
//! human-readable `message` (status is the one exception) and the
//! operation's payload fields. Domain errors map to 404 for the
//! not-found family and 409 for state conflicts; malformed requests
//! get 400.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde_json::json;

use strata_core::{
    FileDiff, RegistryError, RepoError, RepositoryRegistry, DEFAULT_BRANCH,
};

use crate::ApiError;

/// Request body for `/api/add`
#[derive(Debug, serde::Deserialize)]
struct AddRequest {
    filename: String,
    content: String,
}

/// Request body for `/api/commit`
#[derive(Debug, serde::Deserialize)]
struct CommitRequest {
    message: String,
}

/// Request body for `/api/diff`
#[derive(Debug, serde::Deserialize)]
struct DiffRequest {
    filename: String,
}

/// Request body for `/api/branch`, `/api/checkout`, `/api/repos` and
/// `/api/repos/switch`
#[derive(Debug, serde::Deserialize)]
struct NameRequest {
    name: String,
}

/// Request body for `/api/merge`
#[derive(Debug, serde::Deserialize)]
struct MergeRequest {
    branch: String,
}

/// Request body for `/api/revert`
#[derive(Debug, serde::Deserialize)]
struct RevertRequest {
    commit_id: String,
}

pub fn handle_health() -> Result<Response<Full<Bytes>>, ApiError> {
    json_response(200, json!({"status": "ok"}))
}

pub fn handle_repo_create(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: NameRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let name = req.name.trim();
    if name.is_empty() {
        return fail(400, "Repository name cannot be empty".to_string());
    }

    match registry.create(name) {
        Ok(()) => ok(json!({
            "success": true,
            "message": format!("Created and switched to repository: {}", name),
            "repo": name,
        })),
        Err(err) => fail_registry(&err),
    }
}

pub fn handle_repo_list(
    registry: &RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repos = registry.list();
    let total = repos.len();
    ok(json!({
        "success": true,
        "repos": repos,
        "total": total,
    }))
}

pub fn handle_repo_switch(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: NameRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };

    match registry.switch_to(&req.name) {
        Ok(()) => ok(json!({
            "success": true,
            "message": format!("Switched to repo: {}", req.name),
            "repo": req.name,
        })),
        Err(err) => fail_registry(&err),
    }
}

pub fn handle_repo_delete(
    name: &str,
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return fail(400, "Repository name cannot be empty".to_string());
    }

    match registry.delete(name) {
        Ok(()) => ok(json!({
            "success": true,
            "message": format!("Deleted repository: {}", name),
        })),
        Err(err) => fail_registry(&err),
    }
}

pub fn handle_init(
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.init() {
        Ok(()) => ok(json!({
            "success": true,
            "message": "Initialized empty Strata repository.",
            "branch": DEFAULT_BRANCH,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_add(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: AddRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.add(&req.filename, &req.content) {
        Ok(digest) => ok(json!({
            "success": true,
            "message": format!("Staged: {}", req.filename),
            "hash": digest,
            "filename": req.filename,
        })),
        Err(RepoError::NotInitialized) => fail(
            409,
            "Error: repo not initialized. Run 'init' first.".to_string(),
        ),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_commit(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: CommitRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.commit(&req.message) {
        Ok(receipt) => ok(json!({
            "success": true,
            "message": format!("[{} {}] {}", receipt.branch, receipt.id, req.message),
            "commitId": receipt.id,
            "branch": receipt.branch,
            "fileCount": receipt.file_count,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_log(registry: &RepositoryRegistry) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.log() {
        Ok(page) if page.commits.is_empty() => ok(json!({
            "success": true,
            "message": "No commits yet.",
            "commits": [],
            "total": 0,
        })),
        Ok(page) => ok(json!({
            "success": true,
            "message": format!("Commit History ({})", page.branch),
            "branch": page.branch,
            "commits": page.commits,
            "total": page.total,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_status(registry: &RepositoryRegistry) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.status() {
        Ok(report) => ok(json!({
            "success": true,
            "branch": report.branch,
            "staged": report.staged,
            "working": report.working,
            "undoCount": report.undo_count,
            "redoCount": report.redo_count,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_diff(
    body: &[u8],
    registry: &RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: DiffRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.diff(&req.filename) {
        Ok(FileDiff::New {
            working_hash,
            working_content,
        }) => ok(json!({
            "success": true,
            "status": "new",
            "message": format!("+ {} [{}] (new file)", req.filename, working_hash),
            "filename": req.filename,
            "workingHash": working_hash,
            "workingContent": working_content,
        })),
        Ok(FileDiff::Added {
            working_hash,
            working_content,
        }) => ok(json!({
            "success": true,
            "status": "new",
            "message": format!("+ {} (new - not in last commit)", req.filename),
            "filename": req.filename,
            "workingHash": working_hash,
            "workingContent": working_content,
        })),
        Ok(FileDiff::Unchanged { .. }) => ok(json!({
            "success": true,
            "status": "unchanged",
            "message": format!("{} - no changes.", req.filename),
            "filename": req.filename,
        })),
        Ok(FileDiff::Modified {
            committed_hash,
            working_hash,
            committed_content,
            working_content,
        }) => ok(json!({
            "success": true,
            "status": "modified",
            "message": format!("{} - MODIFIED", req.filename),
            "filename": req.filename,
            "committedHash": committed_hash,
            "workingHash": working_hash,
            "committedContent": committed_content,
            "workingContent": working_content,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_branch_create(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: NameRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.branch_create(&req.name) {
        Ok(()) => ok(json!({
            "success": true,
            "message": format!("Created branch: {}", req.name),
            "branch": req.name,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_branches(
    registry: &RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.branch_list() {
        Ok(branches) => {
            let total = branches.len();
            ok(json!({
                "success": true,
                "branches": branches,
                "total": total,
            }))
        }
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_branch_delete(
    name: &str,
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return fail(400, "Branch name cannot be empty".to_string());
    }
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.branch_delete(name) {
        Ok(()) => ok(json!({
            "success": true,
            "message": format!("Deleted branch: {}", name),
            "branch": name,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_checkout(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: NameRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.checkout(&req.name) {
        Ok(out) => {
            let message = match out.head {
                Some(_) => format!(
                    "Switched to branch: {} - Restored {} file(s).",
                    out.branch, out.file_count
                ),
                None => format!(
                    "Switched to branch: {} - Branch has no commits yet.",
                    out.branch
                ),
            };
            ok(json!({
                "success": true,
                "message": message,
                "branch": out.branch,
            }))
        }
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_merge(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: MergeRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.merge(&req.branch) {
        Ok(out) => ok(json!({
            "success": true,
            "message": out.message,
            "commitId": out.id,
            "fileCount": out.file_count,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_undo(
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.undo() {
        Ok(out) => match out.restored {
            Some(id) => ok(json!({
                "success": true,
                "message": format!("Undo: reverted to commit {}", id),
                "commitId": id,
            })),
            None => ok(json!({
                "success": true,
                "message": "Undo: reverted to initial state (no commits).",
            })),
        },
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_redo(
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.redo() {
        Ok(out) => ok(json!({
            "success": true,
            "message": format!("Redo: restored commit {} - {}", out.restored, out.message),
            "commitId": out.restored,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_revert(
    body: &[u8],
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let req: RevertRequest = match parse_json(body) {
        Ok(req) => req,
        Err(msg) => return fail(400, msg),
    };
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    match repo.revert(&req.commit_id) {
        Ok(out) => ok(json!({
            "success": true,
            "message": format!("Reverted to commit {}", req.commit_id),
            "newCommitId": out.new_commit,
            "fileCount": out.file_count,
        })),
        Err(err) => fail_repo(&err),
    }
}

pub fn handle_reset(
    registry: &mut RepositoryRegistry,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let repo = match registry.active_mut() {
        Ok(repo) => repo,
        Err(err) => return fail_registry(&err),
    };

    repo.reset();
    ok(json!({
        "success": true,
        "message": "Repository reset.",
    }))
}

pub fn handle_not_found() -> Result<Response<Full<Bytes>>, ApiError> {
    fail(404, "Not found.".to_string())
}

pub fn payload_too_large() -> Result<Response<Full<Bytes>>, ApiError> {
    fail(413, "Request body too large.".to_string())
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|err| format!("Invalid JSON: {}", err))
}

fn ok(value: serde_json::Value) -> Result<Response<Full<Bytes>>, ApiError> {
    json_response(200, value)
}

fn fail(status: u16, message: String) -> Result<Response<Full<Bytes>>, ApiError> {
    json_response(status, json!({"success": false, "message": message}))
}

fn fail_repo(err: &RepoError) -> Result<Response<Full<Bytes>>, ApiError> {
    fail(repo_error_status(err), repo_error_message(err))
}

fn fail_registry(err: &RegistryError) -> Result<Response<Full<Bytes>>, ApiError> {
    let status = match err {
        RegistryError::RepositoryNotFound(_) => 404,
        _ => 409,
    };
    let message = match err {
        RegistryError::RepositoryAlreadyExists(name) => {
            format!("Repository '{}' already exists.", name)
        }
        RegistryError::RepositoryNotFound(name) => format!("Repository '{}' not found.", name),
        RegistryError::CannotDeleteActiveRepository(_) => {
            "Cannot delete the active repo. Switch first.".to_string()
        }
        RegistryError::NoActiveRepository => {
            "No repository selected. Run 'repo create <name>' first.".to_string()
        }
    };
    fail(status, message)
}

fn repo_error_status(err: &RepoError) -> u16 {
    match err {
        RepoError::BranchNotFound(_)
        | RepoError::CommitNotFound(_)
        | RepoError::FileNotInWorkingSet(_) => 404,
        _ => 409,
    }
}

/// Client-facing wording for each domain error.
fn repo_error_message(err: &RepoError) -> String {
    match err {
        RepoError::NotInitialized => "Error: repo not initialized.".to_string(),
        RepoError::AlreadyInitialized => "Repository already initialized.".to_string(),
        RepoError::NothingToCommit => "Nothing to commit. Use 'add' first.".to_string(),
        RepoError::FileNotInWorkingSet(name) => {
            format!("File '{}' not in working directory.", name)
        }
        RepoError::BranchAlreadyExists(name) => format!("Branch '{}' already exists.", name),
        RepoError::BranchNotFound(name) => format!("Branch '{}' not found.", name),
        RepoError::CannotDeleteActive(name) => {
            format!("Cannot delete active branch '{}'.", name)
        }
        RepoError::CannotMergeSelf => "Cannot merge branch into itself.".to_string(),
        RepoError::SourceHasNoCommits(_) => "Source branch has no commits.".to_string(),
        RepoError::NothingToUndo => "Nothing to undo.".to_string(),
        RepoError::NothingToRedo => "Nothing to redo.".to_string(),
        RepoError::NoCommitsToRevert => "No commits to revert.".to_string(),
        RepoError::CommitNotFound(id) => format!("Commit '{}' not found.", id),
    }
}

fn json_response(
    status: u16,
    value: serde_json::Value,
) -> Result<Response<Full<Bytes>>, ApiError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(value.to_string())))
        .unwrap())
}
