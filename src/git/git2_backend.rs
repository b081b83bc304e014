use chrono::{DateTime, FixedOffset};
use git2::{
    Commit, Cred, CredentialType, ErrorCode, PushOptions, RemoteCallbacks, Repository, Signature,
    Time,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use tracing::debug;

use super::VersionControl;
use crate::error::VcsError;

/// [`VersionControl`] on top of a `git2` repository.
pub struct Git2Backend {
    repo: Repository,
    remote: String,
}

impl Git2Backend {
    /// Open the repository whose working tree is `workdir`, pushing to `remote`.
    ///
    /// # Errors
    /// Returns an error if `workdir` is not a git repository.
    pub fn open(workdir: &Path, remote: impl Into<String>) -> Result<Self, VcsError> {
        let repo = Repository::open(workdir)?;
        Ok(Self {
            repo,
            remote: remote.into(),
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }
}

/// Pick a credential for the kinds the remote accepts.
///
/// libgit2 calls back again after every rejected credential, so only one
/// key/default credential is offered per push; the next request fails
/// instead of looping. Username-only requests (ssh URLs without a user)
/// do not count as an attempt.
fn next_credential(
    attempts: &Cell<u32>,
    username_from_url: Option<&str>,
    allowed: CredentialType,
) -> Result<Cred, git2::Error> {
    let user = username_from_url.unwrap_or("git");
    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(user);
    }
    if attempts.get() > 0 {
        return Err(git2::Error::from_str(
            "authentication failed: remote rejected the offered credentials",
        ));
    }
    attempts.set(attempts.get() + 1);

    if allowed.contains(CredentialType::SSH_KEY) {
        Cred::ssh_key_from_agent(user)
    } else if allowed.contains(CredentialType::DEFAULT) {
        Cred::default()
    } else {
        Err(git2::Error::from_str(
            "authentication failed: no supported credential type (ssh agent or default)",
        ))
    }
}

/// Build push options with SSH-agent credentials enabled.
///
/// Falls back to default credentials when the remote does not take SSH keys.
/// Rejected reference updates are collected into `rejected`.
fn push_opts_with_creds(rejected: &RefCell<Option<(String, String)>>) -> PushOptions<'_> {
    let mut cb = RemoteCallbacks::new();
    let attempts = Cell::new(0);
    cb.credentials(move |_url, username_from_url, allowed| {
        next_credential(&attempts, username_from_url, allowed)
    });
    cb.push_update_reference(move |refname, status| {
        if let Some(msg) = status {
            *rejected.borrow_mut() = Some((refname.to_string(), msg.to_string()));
        }
        Ok(())
    });

    let mut po = PushOptions::new();
    po.remote_callbacks(cb);
    po
}

/// Author/committer signature from the repository config, stamped with `date`.
///
/// # Errors
/// Returns an error if `user.name` / `user.email` are not configured.
fn signature_at(repo: &Repository, date: &DateTime<FixedOffset>) -> Result<Signature<'static>, VcsError> {
    let base = repo.signature()?;
    let name = String::from_utf8_lossy(base.name_bytes()).into_owned();
    let email = String::from_utf8_lossy(base.email_bytes()).into_owned();
    let time = Time::new(date.timestamp(), date.offset().local_minus_utc() / 60);
    Ok(Signature::new(&name, &email, &time)?)
}

/// Current HEAD commit, or `None` on an unborn branch.
fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>, VcsError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl VersionControl for Git2Backend {
    fn stage(&mut self, path: &Path) -> Result<(), VcsError> {
        let mut index = self.repo.index()?;
        index.add_path(path)?;
        index.write()?;
        debug!(path = %path.display(), "staged");
        Ok(())
    }

    fn commit(&mut self, message: &str, date: &DateTime<FixedOffset>) -> Result<String, VcsError> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = head_commit(&self.repo)?;
        let parents: Vec<&Commit> = parent.iter().collect();

        let sig = signature_at(&self.repo, date)?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        debug!(%oid, %message, "committed");
        Ok(oid.to_string())
    }

    fn push(&mut self) -> Result<(), VcsError> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(VcsError::DetachedHead);
        }
        let branch = head
            .name()
            .ok_or_else(|| VcsError::Other("invalid branch name".to_string()))?
            .to_string();

        let mut remote = match self.repo.find_remote(&self.remote) {
            Ok(r) => r,
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
                return Err(VcsError::NoRemote(self.remote.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let rejected = RefCell::new(None);
        let mut po = push_opts_with_creds(&rejected);
        let refspec = format!("{}:{}", branch, branch);
        remote.push(&[refspec.as_str()], Some(&mut po))?;
        drop(po);

        if let Some((reference, message)) = rejected.into_inner() {
            return Err(VcsError::Rejected { reference, message });
        }
        debug!(remote = %self.remote, %branch, "pushed");
        Ok(())
    }
}
