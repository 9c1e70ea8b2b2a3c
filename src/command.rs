// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The command batch model for [`crate::Session::invoke`].
//!
//! A [`Command`] is either a single shell command line or a batch of further
//! commands, nested to any depth. Evaluating a command yields a
//! [`CommandOutput`] of structurally identical shape: every leaf string is
//! replaced by that command's captured output, every batch by the batch of
//! its results, with sibling order preserved. Callers rely on the positional
//! correspondence between command and result.

/// One command line or a nested batch of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A single shell command line, executed on its own channel.
    Exec(String),
    /// An ordered group of commands, evaluated sequentially.
    Batch(Vec<Command>),
}

impl Command {
    /// Build a batch from anything iterable of command-convertible items.
    pub fn batch<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        Command::Batch(commands.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Command::Exec(command.to_string())
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Command::Exec(command)
    }
}

impl<C: Into<Command>> From<Vec<C>> for Command {
    fn from(commands: Vec<C>) -> Self {
        Command::batch(commands)
    }
}

impl<C: Into<Command>, const N: usize> From<[C; N]> for Command {
    fn from(commands: [C; N]) -> Self {
        Command::batch(commands)
    }
}

/// The result of evaluating a [`Command`], mirroring its nesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Raw accumulated output of one command.
    Output(String),
    /// Results of a batch, one element per input sibling, same order.
    Batch(Vec<CommandOutput>),
}

impl CommandOutput {
    /// Output string of a single command, or `None` for a batch.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CommandOutput::Output(output) => Some(output),
            CommandOutput::Batch(_) => None,
        }
    }

    /// Batch results, or `None` for a single output.
    pub fn as_batch(&self) -> Option<&[CommandOutput]> {
        match self {
            CommandOutput::Output(_) => None,
            CommandOutput::Batch(results) => Some(results),
        }
    }

    /// Consume into the output string of a single command.
    pub fn into_string(self) -> Option<String> {
        match self {
            CommandOutput::Output(output) => Some(output),
            CommandOutput::Batch(_) => None,
        }
    }

    /// Consume into the results of a batch.
    pub fn into_vec(self) -> Option<Vec<CommandOutput>> {
        match self {
            CommandOutput::Output(_) => None,
            CommandOutput::Batch(results) => Some(results),
        }
    }
}

/// Build a [`Command::Batch`] from a bracketed list, nesting with inner
/// brackets:
///
/// ```
/// use tether::batch;
///
/// let plan = batch!["echo 1", ["echo 2", "echo 3"], "echo 4"];
/// ```
///
/// Elements are command strings (or any single-token expression convertible
/// into a [`Command`]); a bracketed element becomes a nested batch.
#[macro_export]
macro_rules! batch {
    ($($item:tt),* $(,)?) => {
        $crate::Command::Batch(vec![$($crate::batch!(@item $item)),*])
    };
    (@item [$($inner:tt),* $(,)?]) => {
        $crate::Command::Batch(vec![$($crate::batch!(@item $inner)),*])
    };
    (@item $command:expr) => {
        $crate::Command::from($command)
    };
}
