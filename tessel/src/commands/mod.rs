//! 控制台命令注册表
//!
//! 注册表只负责保存命令定义与其处理器，参数解析与执行循环由上层负责。
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 容器中绑定的共享命令注册表
pub type SharedCommandRegistry = RwLock<CommandRegistry>;

/// 命令定义错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    InvalidName { name: String, reason: &'static str },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { name, reason } => {
                write!(f, "invalid command name `{name}`: {reason}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// 命令定义
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    name: String,
    description: String,
    help_text: Option<String>,
}

impl Command {
    /// 创建命令定义，名称不能为空且不能包含空白字符
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CommandError::InvalidName {
                name,
                reason: "name is empty",
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(CommandError::InvalidName {
                name,
                reason: "name contains whitespace",
            });
        }
        Ok(Self {
            name,
            description: description.into(),
            help_text: None,
        })
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }
}

/// 命令处理器，返回进程退出码
pub trait CommandHandler: Send + Sync + 'static {
    fn handle(&self, args: &[String]) -> anyhow::Result<i32>;
}

impl<F> CommandHandler for F
where
    F: Fn(&[String]) -> anyhow::Result<i32> + Send + Sync + 'static,
{
    fn handle(&self, args: &[String]) -> anyhow::Result<i32> {
        self(args)
    }
}

/// 命令与其处理器的绑定
#[derive(Clone)]
pub struct CommandBinding {
    pub command: Command,
    pub handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for CommandBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBinding")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// 命令注册表，保持注册顺序
#[derive(Debug, Default)]
pub struct CommandRegistry {
    bindings: Vec<CommandBinding>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个命令
    ///
    /// 同名命令会被替换，但保留其原来的位置
    pub fn register_command(
        &mut self,
        command: Command,
        handler: impl CommandHandler,
    ) -> &mut Self {
        let binding = CommandBinding {
            command,
            handler: Arc::new(handler),
        };
        match self
            .bindings
            .iter_mut()
            .find(|b| b.command.name == binding.command.name)
        {
            Some(existing) => {
                tracing::debug!(command = %binding.command.name, "replacing command");
                *existing = binding;
            }
            None => {
                tracing::trace!(command = %binding.command.name, "registering command");
                self.bindings.push(binding);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandBinding> {
        self.bindings.iter().find(|b| b.command.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandBinding> {
        let index = self.bindings.iter().position(|b| b.command.name == name)?;
        Some(self.bindings.remove(index))
    }

    /// 按注册顺序返回命令名称
    pub fn names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.command.name()).collect()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.bindings.iter().map(|b| &b.command)
    }

    pub fn bindings(&self) -> &[CommandBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &[String]) -> anyhow::Result<i32> {
        Ok(0)
    }

    #[test]
    fn names_are_validated() {
        assert!(Command::new("", "").is_err());
        assert!(Command::new("cache clear", "").is_err());
        assert!(Command::new("cache:clear", "Clears the cache").is_ok());
    }

    #[test]
    fn re_registering_keeps_position() {
        let mut registry = CommandRegistry::new();
        registry
            .register_command(Command::new("a", "first").unwrap(), noop)
            .register_command(Command::new("b", "").unwrap(), noop)
            .register_command(
                Command::new("a", "second").unwrap(),
                |_: &[String]| -> anyhow::Result<i32> { Ok(7) },
            );

        assert_eq!(registry.names(), ["a", "b"]);
        let a = registry.get("a").unwrap();
        assert_eq!(a.command.description(), "second");
        assert_eq!(a.handler.handle(&[]).unwrap(), 7);
    }

    #[test]
    fn remove_drops_binding() {
        let mut registry = CommandRegistry::new();
        registry.register_command(Command::new("a", "").unwrap(), noop);
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
        assert!(registry.remove("a").is_none());
    }
}
