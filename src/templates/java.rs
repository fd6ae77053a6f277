//! Spring Boot service skeletons (Maven)

use super::{TemplateConfig, TemplateSet, Vars, render, slug};
use crate::types::{CloudProvider, DatabaseType};

const POM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>{{spring_boot_version}}</version>
        <relativePath/>
    </parent>

    <groupId>{{group_id}}</groupId>
    <artifactId>{{artifact_id}}</artifactId>
    <version>0.1.0</version>
    <name>{{app_name}}</name>

    <properties>
        <java.version>{{java_version}}</java.version>
    </properties>

    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-validation</artifactId>
        </dependency>{{database_dependencies}}{{cloud_dependencies}}{{optional_dependencies}}
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-test</artifactId>
            <scope>test</scope>
        </dependency>
    </dependencies>

    <build>
        <plugins>
            <plugin>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-maven-plugin</artifactId>
            </plugin>
        </plugins>
    </build>
</project>
"#;

const APPLICATION_JAVA: &str = r#"package {{package_name}};

import org.springframework.boot.SpringApplication;
import org.springframework.boot.autoconfigure.SpringBootApplication;{{application_imports}}

{{application_annotations}}
public class {{class_name}} {

    public static void main(String[] args) {
        SpringApplication.run({{class_name}}.class, args);
    }
}
"#;

const APPLICATION_YML: &str = r#"server:
  port: ${SERVER_PORT:8080}
  servlet:
    context-path: /api

spring:
  application:
    name: {{artifact_id}}
  profiles:
    active: ${SPRING_PROFILES_ACTIVE:{{provider}}}{{datasource}}{{cache_yml}}{{security_yml}}
{{monitoring_yml}}
logging:
  level:
    {{package_name}}: ${LOG_LEVEL:INFO}

cloud:
  provider: {{provider}}

app:
  name: {{app_name}}
  version: 0.1.0
"#;

const AWS_CONFIG_JAVA: &str = r#"package {{package_name}}.config;

import org.springframework.boot.autoconfigure.condition.ConditionalOnProperty;
import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;
import software.amazon.awssdk.auth.credentials.DefaultCredentialsProvider;
import software.amazon.awssdk.regions.Region;
import software.amazon.awssdk.services.s3.S3Client;

@Configuration
@ConditionalOnProperty(name = "cloud.provider", havingValue = "aws")
public class AwsConfig {

    @Bean
    public S3Client s3Client() {
        return S3Client.builder()
                .region(Region.of(System.getenv().getOrDefault("AWS_REGION", "us-east-1")))
                .credentialsProvider(DefaultCredentialsProvider.create())
                .build();
    }
}
"#;

const AWS_PROFILE_YML: &str = r#"cloud:
  aws:
    region:
      static: ${AWS_REGION:us-east-1}
    credentials:
      use-default-aws-credentials-chain: true
    s3:
      bucket: ${AWS_S3_BUCKET:}
"#;

const AZURE_CONFIG_JAVA: &str = r#"package {{package_name}}.config;

import com.azure.identity.DefaultAzureCredentialBuilder;
import com.azure.storage.blob.BlobServiceClient;
import com.azure.storage.blob.BlobServiceClientBuilder;
import org.springframework.boot.autoconfigure.condition.ConditionalOnProperty;
import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;

@Configuration
@ConditionalOnProperty(name = "cloud.provider", havingValue = "azure")
public class AzureConfig {

    @Bean
    public BlobServiceClient blobServiceClient() {
        String storageAccount = System.getenv("AZURE_STORAGE_ACCOUNT");
        return new BlobServiceClientBuilder()
                .endpoint("https://" + storageAccount + ".blob.core.windows.net")
                .credential(new DefaultAzureCredentialBuilder().build())
                .buildClient();
    }
}
"#;

const AZURE_PROFILE_YML: &str = r#"azure:
  storage:
    account-name: ${AZURE_STORAGE_ACCOUNT:}
    container-name: ${AZURE_STORAGE_CONTAINER:}
"#;

const HEALTH_CONTROLLER: &str = r#"package {{package_name}}.controller;

import org.springframework.beans.factory.annotation.Value;
import org.springframework.http.ResponseEntity;
import org.springframework.web.bind.annotation.GetMapping;
import org.springframework.web.bind.annotation.RequestMapping;
import org.springframework.web.bind.annotation.RestController;

import java.time.Instant;
import java.util.LinkedHashMap;
import java.util.Map;

@RestController
@RequestMapping("/health")
public class HealthController {

    @Value("${app.name}")
    private String appName;

    @Value("${app.version}")
    private String appVersion;

    @GetMapping
    public ResponseEntity<Map<String, Object>> health() {
        Map<String, Object> health = new LinkedHashMap<>();
        health.put("status", "UP");
        health.put("timestamp", Instant.now().toString());
        health.put("service", appName);
        health.put("version", appVersion);
        health.put("provider", "{{provider}}");
        return ResponseEntity.ok(health);
    }
}
"#;

const CACHE_CONFIG: &str = r#"package {{package_name}}.config;

import org.springframework.cache.CacheManager;
import org.springframework.cache.annotation.EnableCaching;
import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;
import org.springframework.data.redis.cache.RedisCacheConfiguration;
import org.springframework.data.redis.cache.RedisCacheManager;
import org.springframework.data.redis.connection.RedisConnectionFactory;

import java.time.Duration;

@Configuration
@EnableCaching
public class CacheConfig {

    @Bean
    public CacheManager cacheManager(RedisConnectionFactory connectionFactory) {
        return RedisCacheManager.builder(connectionFactory)
                .cacheDefaults(RedisCacheConfiguration.defaultCacheConfig().entryTtl(Duration.ofMinutes(30)))
                .build();
    }
}
"#;

const SECURITY_CONFIG: &str = r#"package {{package_name}}.config;

import org.springframework.context.annotation.Bean;
import org.springframework.context.annotation.Configuration;
import org.springframework.security.config.Customizer;
import org.springframework.security.config.annotation.web.builders.HttpSecurity;
import org.springframework.security.config.annotation.web.configuration.EnableWebSecurity;
import org.springframework.security.config.http.SessionCreationPolicy;
import org.springframework.security.web.SecurityFilterChain;

@Configuration
@EnableWebSecurity
public class SecurityConfig {

    @Bean
    public SecurityFilterChain filterChain(HttpSecurity http) throws Exception {
        http.csrf(csrf -> csrf.disable())
            .sessionManagement(session -> session.sessionCreationPolicy(SessionCreationPolicy.STATELESS))
            .authorizeHttpRequests(authz -> authz
                .requestMatchers("/health/**", "/actuator/**").permitAll()
                .anyRequest().authenticated())
            .oauth2ResourceServer(oauth2 -> oauth2.jwt(Customizer.withDefaults()));
        return http.build();
    }
}
"#;

const DOCKERFILE: &str = r#"FROM eclipse-temurin:{{java_version}}-jdk AS build
WORKDIR /app
COPY pom.xml .
COPY src src
RUN mvn -q clean package -DskipTests

FROM eclipse-temurin:{{java_version}}-jre
WORKDIR /app
COPY --from=build /app/target/{{artifact_id}}-*.jar app.jar
EXPOSE 8080
HEALTHCHECK --interval=30s --timeout=3s --start-period=10s --retries=3 \
  CMD curl -f http://localhost:8080/api/health || exit 1
ENTRYPOINT ["java", "-jar", "/app/app.jar"]
"#;

fn dependency(group: &str, artifact: &str, scope: Option<&str>) -> String {
    let scope = scope
        .map(|s| format!("\n            <scope>{}</scope>", s))
        .unwrap_or_default();
    format!(
        "\n        <dependency>\n            <groupId>{}</groupId>\n            <artifactId>{}</artifactId>{}\n        </dependency>",
        group, artifact, scope
    )
}

fn database_dependencies(database: DatabaseType) -> String {
    match database {
        DatabaseType::Postgresql => {
            dependency("org.springframework.boot", "spring-boot-starter-data-jpa", None)
                + &dependency("org.postgresql", "postgresql", Some("runtime"))
        }
        DatabaseType::Mysql => {
            dependency("org.springframework.boot", "spring-boot-starter-data-jpa", None)
                + &dependency("com.mysql", "mysql-connector-j", Some("runtime"))
        }
        DatabaseType::Mongodb => {
            dependency("org.springframework.boot", "spring-boot-starter-data-mongodb", None)
        }
        DatabaseType::Cosmosdb => dependency("com.azure", "azure-spring-data-cosmos", None),
        DatabaseType::Dynamodb => dependency("software.amazon.awssdk", "dynamodb-enhanced", None),
    }
}

fn datasource_yml(database: DatabaseType) -> &'static str {
    match database {
        DatabaseType::Postgresql => {
            "\n  datasource:\n    url: jdbc:postgresql://${DATABASE_HOST:localhost}:${DATABASE_PORT:5432}/${DATABASE_NAME:app}\n    username: ${DATABASE_USERNAME:postgres}\n    password: ${DATABASE_PASSWORD:}"
        }
        DatabaseType::Mysql => {
            "\n  datasource:\n    url: jdbc:mysql://${DATABASE_HOST:localhost}:${DATABASE_PORT:3306}/${DATABASE_NAME:app}\n    username: ${DATABASE_USERNAME:root}\n    password: ${DATABASE_PASSWORD:}"
        }
        DatabaseType::Mongodb => "\n  data:\n    mongodb:\n      uri: ${MONGODB_URI:mongodb://localhost:27017/app}",
        DatabaseType::Cosmosdb => {
            "\n  cloud:\n    azure:\n      cosmos:\n        endpoint: ${AZURE_COSMOS_ENDPOINT:}\n        database: ${AZURE_COSMOS_DATABASE:app}"
        }
        DatabaseType::Dynamodb => "",
    }
}

/// `order-service` → `OrderServiceApplication`
fn class_name(app_name: &str) -> String {
    let mut name: String = slug(app_name)
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "App");
    }
    name + "Application"
}

fn vars(config: &TemplateConfig, provider: CloudProvider) -> Vars {
    let artifact_id = slug(&config.app_name);
    let group_id = config
        .package_name
        .rsplit_once('.')
        .map(|(group, _)| group.to_string())
        .unwrap_or_else(|| config.package_name.clone());

    let cloud_dependencies = match provider {
        CloudProvider::Aws => {
            dependency("io.awspring.cloud", "spring-cloud-aws-starter", None)
                + &dependency("software.amazon.awssdk", "s3", None)
        }
        CloudProvider::Azure => {
            dependency("com.azure.spring", "spring-cloud-azure-starter", None)
                + &dependency("com.azure", "azure-storage-blob", None)
        }
    };

    let mut optional = String::new();
    let mut imports = Vec::new();
    let mut annotations = vec!["@SpringBootApplication"];
    if config.cache {
        optional += &dependency("org.springframework.boot", "spring-boot-starter-data-redis", None);
        optional += &dependency("org.springframework.boot", "spring-boot-starter-cache", None);
        imports.push("\nimport org.springframework.cache.annotation.EnableCaching;");
        annotations.push("@EnableCaching");
    }
    if config.security {
        optional += &dependency("org.springframework.boot", "spring-boot-starter-security", None);
        optional += &dependency(
            "org.springframework.boot",
            "spring-boot-starter-oauth2-resource-server",
            None,
        );
    }
    if config.monitoring {
        optional += &dependency("org.springframework.boot", "spring-boot-starter-actuator", None);
        optional += &dependency("io.micrometer", "micrometer-registry-prometheus", None);
    }

    let cache_yml = if config.cache {
        "\n  data:\n    redis:\n      host: ${REDIS_HOST:localhost}\n      port: ${REDIS_PORT:6379}"
    } else {
        ""
    };
    let security_yml = match (config.security, provider) {
        (false, _) => String::new(),
        (true, CloudProvider::Aws) => "\n  security:\n    oauth2:\n      resourceserver:\n        jwt:\n          issuer-uri: ${JWT_ISSUER_URI:}".to_string(),
        (true, CloudProvider::Azure) => "\n  security:\n    oauth2:\n      resourceserver:\n        jwt:\n          issuer-uri: https://login.microsoftonline.com/${AZURE_TENANT_ID}/v2.0".to_string(),
    };
    let monitoring_yml = if config.monitoring {
        "\nmanagement:\n  endpoints:\n    web:\n      exposure:\n        include: health,info,prometheus,metrics\n"
    } else {
        ""
    };

    Vars::from([
        ("app_name", config.app_name.trim().to_string()),
        ("artifact_id", artifact_id),
        ("group_id", group_id),
        ("package_name", config.package_name.clone()),
        ("class_name", class_name(&config.app_name)),
        ("provider", provider.as_str().to_string()),
        ("java_version", config.java_version.clone()),
        ("spring_boot_version", config.spring_boot_version.clone()),
        ("database_dependencies", database_dependencies(config.database)),
        ("cloud_dependencies", cloud_dependencies),
        ("optional_dependencies", optional),
        ("application_imports", imports.concat()),
        ("application_annotations", annotations.join("\n")),
        ("datasource", datasource_yml(config.database).to_string()),
        ("cache_yml", cache_yml.to_string()),
        ("security_yml", security_yml),
        ("monitoring_yml", monitoring_yml.to_string()),
    ])
}

pub(super) fn generate(config: &TemplateConfig, provider: CloudProvider) -> TemplateSet {
    let vars = vars(config, provider);
    let package_dir = format!("src/main/java/{}", config.package_name.replace('.', "/"));
    let mut files = TemplateSet::new();

    files.insert("pom.xml".into(), render(POM_XML, &vars));
    files.insert(
        format!("{}/{}.java", package_dir, vars["class_name"]),
        render(APPLICATION_JAVA, &vars),
    );
    files.insert(
        "src/main/resources/application.yml".into(),
        render(APPLICATION_YML, &vars),
    );

    let (class, class_skeleton, profile) = match provider {
        CloudProvider::Aws => ("AwsConfig", AWS_CONFIG_JAVA, AWS_PROFILE_YML),
        CloudProvider::Azure => ("AzureConfig", AZURE_CONFIG_JAVA, AZURE_PROFILE_YML),
    };
    files.insert(
        format!("{}/config/{}.java", package_dir, class),
        render(class_skeleton, &vars),
    );
    files.insert(
        format!("src/main/resources/application-{}.yml", provider.as_str()),
        profile.to_string(),
    );

    files.insert(
        format!("{}/controller/HealthController.java", package_dir),
        render(HEALTH_CONTROLLER, &vars),
    );
    if config.cache {
        files.insert(
            format!("{}/config/CacheConfig.java", package_dir),
            render(CACHE_CONFIG, &vars),
        );
    }
    if config.security {
        files.insert(
            format!("{}/config/SecurityConfig.java", package_dir),
            render(SECURITY_CONFIG, &vars),
        );
    }
    files.insert("Dockerfile".into(), render(DOCKERFILE, &vars));

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateKind;

    fn config(provider: &str) -> TemplateConfig {
        TemplateConfig::new("order-service", provider, TemplateKind::Java)
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("order-service"), "OrderServiceApplication");
        assert_eq!(class_name("Photo Share"), "PhotoShareApplication");
        assert_eq!(class_name("9lives"), "App9livesApplication");
    }

    #[test]
    fn test_aws_layout() {
        let set = generate(&config("aws"), CloudProvider::Aws);
        let base = "src/main/java/com/example/service";

        assert!(set.contains_key(&format!("{}/OrderServiceApplication.java", base)));
        assert!(set.contains_key(&format!("{}/config/AwsConfig.java", base)));
        assert!(set.contains_key("src/main/resources/application-aws.yml"));
        assert!(set.contains_key(&format!("{}/controller/HealthController.java", base)));
        assert!(set.contains_key(&format!("{}/config/CacheConfig.java", base)));
        assert!(set.contains_key(&format!("{}/config/SecurityConfig.java", base)));
        assert!(set.contains_key("Dockerfile"));

        let pom = &set["pom.xml"];
        assert!(pom.contains("<groupId>com.example</groupId>"));
        assert!(pom.contains("<artifactId>order-service</artifactId>"));
        assert!(pom.contains("spring-cloud-aws-starter"));
        assert!(pom.contains("<version>3.2.0</version>"));
    }

    #[test]
    fn test_azure_layout() {
        let set = generate(&config("azure"), CloudProvider::Azure);
        assert!(set.contains_key("src/main/java/com/example/service/config/AzureConfig.java"));
        assert!(set.contains_key("src/main/resources/application-azure.yml"));
        assert!(set["pom.xml"].contains("spring-cloud-azure-starter"));
        assert!(set["src/main/resources/application.yml"].contains("provider: azure"));
    }

    #[test]
    fn test_flags_drop_optional_files() {
        let mut cfg = config("aws");
        cfg.cache = false;
        cfg.security = false;
        cfg.monitoring = false;

        let set = generate(&cfg, CloudProvider::Aws);
        assert!(!set.keys().any(|k| k.ends_with("CacheConfig.java")));
        assert!(!set.keys().any(|k| k.ends_with("SecurityConfig.java")));
        assert!(!set["pom.xml"].contains("actuator"));
        let app = &set["src/main/java/com/example/service/OrderServiceApplication.java"];
        assert!(!app.contains("@EnableCaching"));
    }

    #[test]
    fn test_database_choice() {
        let mut cfg = config("aws");
        cfg.database = DatabaseType::Mysql;
        let set = generate(&cfg, CloudProvider::Aws);
        assert!(set["pom.xml"].contains("mysql-connector-j"));
        assert!(set["src/main/resources/application.yml"].contains("jdbc:mysql://"));
    }

    #[test]
    fn test_java_version_in_dockerfile() {
        let mut cfg = config("azure");
        cfg.java_version = "21".into();
        let set = generate(&cfg, CloudProvider::Azure);
        assert!(set["Dockerfile"].starts_with("FROM eclipse-temurin:21-jdk"));
    }
}
