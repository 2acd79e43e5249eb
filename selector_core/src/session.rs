use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::sync::Arc;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::converter::{Converter, Converters};
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::shape::classify;
use crate::signature::Parameter;
use crate::target::{Arguments, Partial, Target};
use crate::value::{Annotation, FromValue, Value};

struct Flag {
    /// Target whose registration claimed the flag
    owner: String,
    hint: Option<String>,
    multiple: bool,
    converter: Converter,
}

/// The flag registry shared by every registration made through it.
///
/// A flag name is registered once; later targets declaring the same name
/// read the shared value.
pub struct Session {
    command: Command,
    flags: BTreeMap<String, Flag>,
    converters: Converters,
}

impl Session {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_converters(program, Converters::default())
    }

    pub fn with_converters(program: impl Into<String>, converters: Converters) -> Self {
        let command = Command::new(program.into())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true);
        Session {
            command,
            flags: BTreeMap::new(),
            converters,
        }
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }

    /// Converters registered here apply to flags claimed afterwards.
    pub fn converters_mut(&mut self) -> &mut Converters {
        &mut self.converters
    }

    pub fn is_claimed(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn render_help(&mut self) -> String {
        self.command.render_help().to_string()
    }

    /// Operations in the returned scope parse `args` (without the program
    /// name) instead of the process arguments.
    pub fn with_args<I, T>(&mut self, args: I) -> Scope<'_>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Scope {
            session: self,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn live(&mut self) -> Scope<'_> {
        self.with_args(std::env::args_os().skip(1))
    }

    pub fn bind<T: 'static>(&mut self, name: &str, target: Target<T>) -> Result<Partial<T>> {
        self.live().bind(name, target)
    }

    pub fn select<T: 'static>(
        &mut self,
        name: &str,
        candidates: impl IntoIterator<Item = Target<T>>,
    ) -> Result<Partial<T>> {
        self.live().select(name, candidates)
    }

    pub fn scan<C: 'static>(&mut self, name: &str, namespace: &Namespace) -> Result<Partial<C>> {
        self.live().scan(name, namespace)
    }

    pub fn get<T: Annotation + FromValue>(
        &mut self,
        name: &str,
        default: Option<T>,
    ) -> Result<Option<T>> {
        self.live().get(name, default)
    }

    /// Registers `parameter` as a flag grouped under `heading`. Returns
    /// `false` when the name was already claimed and nothing was registered.
    fn claim(&mut self, heading: &str, parameter: &Parameter) -> bool {
        if let Some(existing) = self.flags.get(&parameter.name) {
            if existing.hint != parameter.hint {
                tracing::warn!(
                    flag = %parameter.name,
                    owner = %existing.owner,
                    group = heading,
                    "flag already registered with a different type, sharing the first registration"
                );
            } else {
                tracing::debug!(flag = %parameter.name, group = heading, "flag already registered");
            }
            return false;
        }

        let (element, multiple) = match classify(parameter.hint.as_deref()) {
            Ok(shape) => (Some(shape.element().to_string()), shape.is_list()),
            Err(missing) => {
                tracing::warn!(parameter = %parameter.name, group = heading, "{missing}");
                (parameter.hint.clone(), false)
            }
        };
        let converter = match &element {
            Some(element) => self.converters.resolve(element),
            None => {
                let name = parameter.name.clone();
                let converter: Converter = Arc::new(move |_: &str| -> Result<Value, String> {
                    Err(format!("type hint for '{name}' seems to be missing"))
                });
                converter
            }
        };

        let mut arg = Arg::new(parameter.name.clone())
            .long(parameter.name.clone())
            .help_heading(heading.to_string())
            .value_parser(clap::value_parser!(String))
            .allow_negative_numbers(true)
            .action(if multiple {
                ArgAction::Append
            } else {
                ArgAction::Set
            });
        if let Some(doc) = &parameter.doc {
            arg = arg.help(doc.clone());
        }
        if let Some(default) = &parameter.default {
            arg = if multiple {
                arg.default_values(default.split(',').map(str::to_string))
            } else {
                arg.default_value(default.clone())
            };
        }
        if let Some(env) = &parameter.env {
            arg = arg.env(env.clone());
        }
        self.command = std::mem::take(&mut self.command).arg(arg);

        tracing::debug!(flag = %parameter.name, group = heading, multiple, "registered flag");
        self.flags.insert(
            parameter.name.clone(),
            Flag {
                owner: heading.to_string(),
                hint: parameter.hint.clone(),
                multiple,
                converter,
            },
        );
        true
    }

    /// The converted value of `name`, or `None` when it is unset.
    fn read(&self, matches: &ArgMatches, name: &str) -> Result<Option<Value>> {
        let Some(flag) = self.flags.get(name) else {
            return Ok(None);
        };
        let convert = |text: &str| {
            (flag.converter)(text).map_err(|reason| Error::Conversion {
                flag: name.to_string(),
                value: text.to_string(),
                reason,
            })
        };
        if flag.multiple {
            let Some(texts) = matches.try_get_many::<String>(name)? else {
                return Ok(None);
            };
            // one occurrence per value on the command line, comma-separated in the environment
            let from_env = matches.value_source(name) == Some(ValueSource::EnvVariable);
            let values = texts
                .flat_map(|text| {
                    if from_env {
                        text.split(',').collect::<Vec<_>>()
                    } else {
                        vec![text.as_str()]
                    }
                })
                .map(convert)
                .collect::<Result<_>>()?;
            Ok(Some(Value::List(values)))
        } else {
            matches
                .try_get_one::<String>(name)?
                .map(|text| convert(text))
                .transpose()
        }
    }

    /// The last text given for `name` on the command line or through its
    /// environment variable. Registered defaults don't count.
    fn supplied(&self, matches: &ArgMatches, name: &str) -> Result<Option<String>> {
        if !self.flags.contains_key(name)
            || matches.value_source(name) == Some(ValueSource::DefaultValue)
        {
            return Ok(None);
        }
        Ok(matches
            .try_get_many::<String>(name)?
            .and_then(|texts| texts.last().cloned()))
    }
}

/// A session paired with the arguments its operations parse.
pub struct Scope<'a> {
    session: &'a mut Session,
    args: Vec<OsString>,
}

impl Scope<'_> {
    /// Registers a flag per declarable parameter of `target`, grouped under
    /// `name`, and binds every parameter that received a value.
    pub fn bind<T: 'static>(&mut self, name: &str, target: Target<T>) -> Result<Partial<T>> {
        let parameters: Vec<Parameter> = target.signature().declarable().cloned().collect();
        for parameter in &parameters {
            self.session.claim(name, parameter);
        }

        let matches = self.parse()?;
        let mut bound = Arguments::new();
        for parameter in &parameters {
            if let Some(value) = self.session.read(&matches, &parameter.name)? {
                bound.insert(parameter.name.clone(), value);
            }
        }
        tracing::debug!(group = name, bound = bound.len(), "bound arguments");
        Ok(Partial::new(target, bound))
    }

    /// Registers `--name` to choose one of `candidates` by name (the first
    /// one by default), then binds the chosen candidate's own parameters.
    pub fn select<T: 'static>(
        &mut self,
        name: &str,
        candidates: impl IntoIterator<Item = Target<T>>,
    ) -> Result<Partial<T>> {
        let candidates: Vec<Target<T>> = candidates.into_iter().collect();
        let default = candidates
            .first()
            .map(|c| c.name().to_string())
            .ok_or_else(|| Error::NoCandidates(name.to_string()))?;
        let mut names: Vec<String> = Vec::new();
        for candidate in &candidates {
            if !names.iter().any(|n| n == candidate.name()) {
                names.push(candidate.name().to_string());
            }
        }

        let flag = Parameter::new(name, "String")
            .with_default(default.clone())
            .with_doc(format!("one of: {}", names.join(", ")));
        self.session.claim(name, &flag);

        let matches = self.parse()?;
        let chosen = self.session.supplied(&matches, name)?.unwrap_or(default);

        let mut by_name: HashMap<String, Target<T>> = candidates
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect();
        let Some(target) = by_name.remove(&chosen) else {
            return Err(Error::Selection {
                selector: name.to_string(),
                value: chosen,
                candidates: names,
            });
        };
        tracing::debug!(selector = name, chosen = %chosen, "selected candidate");
        self.bind(&chosen, target)
    }

    /// Offers every member of `namespace` that can be produced as `C`.
    pub fn scan<C: 'static>(&mut self, name: &str, namespace: &Namespace) -> Result<Partial<C>> {
        let candidates = namespace.candidates::<C>();
        tracing::debug!(
            namespace = namespace.name(),
            found = candidates.len(),
            "scanned namespace"
        );
        self.select(name, candidates)
    }

    /// Registers a single `--name` flag typed by `T` and returns its value,
    /// or `default` when it is unset.
    pub fn get<T: Annotation + FromValue>(
        &mut self,
        name: &str,
        default: Option<T>,
    ) -> Result<Option<T>> {
        self.session.claim(name, &Parameter::typed::<T>(name));
        let matches = self.parse()?;
        match self.session.read(&matches, name)? {
            Some(value) => T::from_value(&value)
                .map(Some)
                .ok_or_else(|| Error::TypeMismatch {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>(),
                    found: value.kind(),
                }),
            None => Ok(default),
        }
    }

    fn parse(&self) -> Result<ArgMatches> {
        let known = known_args(&self.args, |flag| self.session.is_claimed(flag));
        Ok(self.session.command.clone().try_get_matches_from(known)?)
    }
}

/// Keeps the occurrences of claimed flags and their values; everything else
/// on the command line belongs to someone else.
fn known_args(args: &[OsString], is_claimed: impl Fn(&str) -> bool) -> Vec<OsString> {
    let is_long_flag = |token: &OsString| token.to_str().is_some_and(|t| t.starts_with("--"));
    let mut known = Vec::new();
    let mut tokens = args.iter().peekable();
    while let Some(token) = tokens.next() {
        let Some(flag) = token.to_str().and_then(|t| t.strip_prefix("--")) else {
            continue;
        };
        let (name, inline_value) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };
        if !is_claimed(name) {
            continue;
        }
        known.push(token.clone());
        if !inline_value && let Some(value) = tokens.next_if(|next| !is_long_flag(*next)) {
            known.push(value.clone());
        }
    }
    known
}
